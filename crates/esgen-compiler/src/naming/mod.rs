//! Naming and path resolution.
//!
//! Every identifier the generators emit goes through a [`Filter`] taken from
//! [`NamingStrategies`], and every file location through [`NameResolver`].

pub mod case;
mod filter;
mod psr4;
mod resolver;
mod strategies;

pub use filter::{Filter, FilterSpec, FilterStep};
pub use psr4::Psr4Map;
pub use resolver::{ClassLocation, Layout, NameResolver};
pub use strategies::{NamingConfig, NamingStrategies};

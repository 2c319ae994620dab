//! Idempotent merging of code-change descriptions into source trees.
//!
//! A [`ChangeSet`] is applied by [`MergeEngine`] in a fixed pass order:
//! strict types, namespace, imports, class, interfaces, traits, constants,
//! properties, methods, statement injections. Every pass only adds what is
//! missing, so merging the same change set twice is a no-op.

mod change;
mod engine;
pub mod predicates;

pub use change::{ChangeSet, ClassSpec, CodeChange, Pass};
pub use engine::{MergeEngine, MergeOutcome, MergePolicy};

//! PHP source files as editable trees.
//!
//! [`parser`] reads a file into a [`SourceTree`], [`printer`] writes it back.
//! Printing a freshly parsed tree reproduces the file up to layout
//! normalization, and printing is stable under re-parsing.

pub mod ast;
mod builder;
pub mod parser;
pub mod printer;

pub use ast::*;
pub use parser::{parse_source, PhpParser};
pub use printer::{print, print_expr, print_stmt, quote};

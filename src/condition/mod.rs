//! Expression compiling and evaluation module
//!
//! This module handles compiling expression strings like
//! "project && (id || (name && year))" into a definition tree and
//! evaluating that tree against a candidate's key set.

mod ast;
pub mod cache;
mod evaluator;
pub mod parser;


pub use ast::*;
pub use cache::*;
pub use evaluator::*;
pub use parser::*;

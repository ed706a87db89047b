//! Paramatcher - boolean key-presence expressions
//!
//! Compiles expressions such as `project && (id || (name && year))` into a
//! [`Definition`] tree and tests keyed objects against it. Each parenthesized
//! group joins its operands with a single operator (`&&` or `||`); mixing
//! operators requires explicit parentheses.
//!
//! ```
//! use serde_json::json;
//!
//! let rule = paramatcher::build("project && (id || (name && year))");
//! assert!(rule.success());
//! assert!(rule.test(&json!({ "project": "ABC", "id": 123 })));
//! assert!(!rule.test(&json!({ "id": 123 })));
//! ```
//!
//! Python bindings via PyO3 are available behind the `python` feature.

pub mod condition;
pub mod config;
pub mod error;
pub mod rule;

#[cfg(feature = "python")]
mod python;

pub use crate::condition::{evaluate, parse, Candidate, Definition, LogicalOperator};
pub use crate::config::{RuleSet, RuleSetConfig, RuleSource};
pub use crate::error::{ParamatcherError, Result};
pub use crate::rule::{build, CompiledRule};

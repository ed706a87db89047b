//! Error types for the paramatcher compiler

#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

/// Main error type for compiling and loading expressions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamatcherError {
    #[error("Unbalanced parentheses")]
    UnbalancedGrouping,

    #[error("There must be an odd number of tokens, e.g. X || Y. Found {found}")]
    MalformedGroupArity { found: usize },

    #[error("Boolean operators must be the same in group: expected '{expected}', found '{found}'")]
    HeterogeneousOperators { expected: String, found: String },

    #[error("Unknown boolean operator '{0}'")]
    UnknownOperator(String),

    #[error("Group reference {0} is not available")]
    UnresolvedGroup(usize),

    #[error("Operator '{0}' needs at least one operand")]
    EmptyOperator(&'static str),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl From<serde_json::Error> for ParamatcherError {
    fn from(err: serde_json::Error) -> Self {
        ParamatcherError::DeserializationError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<ParamatcherError> for PyErr {
    fn from(err: ParamatcherError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Result type alias for the paramatcher crate
pub type Result<T> = std::result::Result<T, ParamatcherError>;

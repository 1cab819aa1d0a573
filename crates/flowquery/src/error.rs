//! Error types for flowquery
//!
//! Every error is terminal for the call that triggered it: evaluation stops,
//! no partial context is returned, and nothing is retried.

use fizzle::ParseError;
use thiserror::Error;

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Main error type for query building and evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No implementation is registered under this name
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    /// Implementations exist, but none accepts the current context
    #[error("No operation \"{name}\" can evaluate the current context")]
    NoApplicableOperation { name: String },

    /// Two implementations registered with the same name and priority
    #[error("Operation \"{name}\" registered twice with priority {priority}")]
    DuplicatePriority { name: String, priority: i32 },

    /// A selector argument could not be parsed
    #[error("Selector error: {0}")]
    Selector(#[from] ParseError),

    /// A selector parsed, but the operation cannot use it
    #[error("{message}")]
    Fizzle { message: String },

    /// Wrong argument shape for an operation
    #[error("Invalid argument for {operation}(): {message}")]
    InvalidArgument { operation: String, message: String },

    /// A final operation produced a result of the wrong kind
    #[error("Operation \"{operation}\" returned {actual}, expected {expected}")]
    UnexpectedOutcome {
        operation: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The execution bound from the configuration was reached
    #[error("Evaluation exceeded the limit of {limit} operations")]
    OperationLimitExceeded { limit: u64 },

    /// Invalid configuration values
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl QueryError {
    /// Shorthand for a [`QueryError::Fizzle`] error
    pub fn fizzle(message: impl Into<String>) -> Self {
        QueryError::Fizzle {
            message: message.into(),
        }
    }

    /// Shorthand for a [`QueryError::InvalidArgument`] error
    pub fn invalid_argument(operation: &str, message: impl Into<String>) -> Self {
        QueryError::InvalidArgument {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

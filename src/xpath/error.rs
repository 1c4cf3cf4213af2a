//! Error types for path expression parsing and evaluation.

use std::fmt;

/// Errors that can occur while parsing or evaluating a path expression.
///
/// The `Display` output is shown to end users as-is, so every variant carries
/// enough context to locate the problem in the expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Unexpected token at a specific position.
    UnexpectedToken {
        position: usize,
        found: String,
        expected: String,
    },
    /// Unexpected end of input.
    UnexpectedEnd { expected: String },
    /// Invalid syntax with description.
    InvalidSyntax { message: String },
    /// Evaluation visited more nodes than allowed.
    TraversalLimit { limit: usize },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnexpectedToken {
                position,
                found,
                expected,
            } => write!(
                f,
                "Unexpected token '{}' at position {}, expected {}",
                found, position, expected
            ),
            QueryError::UnexpectedEnd { expected } => {
                write!(f, "Unexpected end of expression, expected {}", expected)
            }
            QueryError::InvalidSyntax { message } => {
                write!(f, "Invalid path syntax: {}", message)
            }
            QueryError::TraversalLimit { limit } => {
                write!(f, "Query aborted after visiting {} nodes", limit)
            }
        }
    }
}

impl std::error::Error for QueryError {}

//! Error types
//!
//! Parse failures and share underflow are kept apart so callers can tell an
//! environmental failure (bad input) from a contract violation (double release).

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a tree from a document source.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read input stream: {0}")]
    Stream(#[source] std::io::Error),
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },
    #[error("{0}")]
    Structure(String),
}

impl ParseError {
    pub(crate) fn syntax(position: u64, message: impl std::fmt::Display) -> Self {
        ParseError::Syntax {
            position,
            message: message.to_string(),
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        ParseError::Structure(message.into())
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not parse document: {0}")]
    Parse(#[from] ParseError),
    #[error("attempt to decrease share count below 0")]
    ShareUnderflow,
}

impl DocumentError {
    /// True for caller-side contract breaches, false for input failures.
    pub fn is_usage_violation(&self) -> bool {
        matches!(self, DocumentError::ShareUnderflow)
    }
}

/// Usage violations raised by [`crate::array::TypedArray`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("sizes incompatible in {op}: {left} vs {right}")]
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },
    #[error("left hand side not initialized")]
    Uninitialized,
    #[error("failed to allocate array of {0} elements")]
    Allocation(usize),
    #[error("operation requires a non-empty array")]
    Empty,
}

impl ArrayError {
    pub(crate) fn check_len(op: &'static str, left: usize, right: usize) -> Result<(), ArrayError> {
        if left == right {
            Ok(())
        } else {
            Err(ArrayError::LengthMismatch { op, left, right })
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("value {value:?} of node {node} could not be converted")]
    Conversion { value: String, node: u32 },
    #[error("node {node} has no attribute {name:?}")]
    MissingAttribute { name: String, node: u32 },
    #[error(transparent)]
    Array(#[from] ArrayError),
}

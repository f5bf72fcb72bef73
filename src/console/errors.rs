//! Console error types
//!
//! Validation failures are user-facing and never escape a command: each
//! renders as one fixed line. `ConsoleError` is what does escape: output
//! that cannot be written, or a snapshot that cannot be saved.

use std::io;

use thiserror::Error;

use crate::storage::StorageError;

/// Argument validation failures, in check order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    ClassDoesNotExist,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstanceFound,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,
}

/// Errors that end a console session
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Writing to the console output failed
    #[error("console output failed: {0}")]
    Output(#[from] io::Error),

    /// Persisting a mutation failed
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_fixed() {
        assert_eq!(ValidationError::ClassNameMissing.to_string(), "** class name missing **");
        assert_eq!(ValidationError::ClassDoesNotExist.to_string(), "** class doesn't exist **");
        assert_eq!(ValidationError::InstanceIdMissing.to_string(), "** instance id missing **");
        assert_eq!(ValidationError::NoInstanceFound.to_string(), "** no instance found **");
        assert_eq!(
            ValidationError::AttributeNameMissing.to_string(),
            "** attribute name missing **"
        );
        assert_eq!(ValidationError::ValueMissing.to_string(), "** value missing **");
    }
}

//! Storage error types
//!
//! Every storage error carries a code and the severity it is logged at.
//! Only corruption is FATAL: it means the backing file exists but cannot
//! be trusted, and the shell must not start on it.

use std::fmt;
use std::io;

use crate::observability::Severity;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Directory or file system failure outside a read or write
    StorageIoError,
    /// Snapshot could not be written or committed
    StorageWriteFailed,
    /// Backing file exists but could not be read
    StorageReadFailed,
    /// Backing file read but not a valid snapshot
    DataCorruption,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageIoError => "MODELSHELL_STORAGE_IO_ERROR",
            StorageErrorCode::StorageWriteFailed => "MODELSHELL_STORAGE_WRITE_FAILED",
            StorageErrorCode::StorageReadFailed => "MODELSHELL_STORAGE_READ_FAILED",
            StorageErrorCode::DataCorruption => "MODELSHELL_DATA_CORRUPTION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failed storage operation
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    /// Table key of the offending entry, for per-entry corruption
    key: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// An operation that failed on the file system.
    pub fn io(code: StorageErrorCode, message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code,
            message: message.into(),
            key: None,
            source: Some(source),
        }
    }

    /// A snapshot that could not be produced, with no OS error behind it.
    pub fn unwritable(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::StorageWriteFailed,
            message: message.into(),
            key: None,
            source: None,
        }
    }

    /// The backing file is not a valid snapshot.
    pub fn corruption(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: message.into(),
            key: None,
            source: None,
        }
    }

    /// Pins the error to one table entry.
    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Key of the entry that failed to decode, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether this error must stop the shell from starting
    pub fn is_fatal(&self) -> bool {
        self.code.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.code.severity(), self.code)?;
        if let Some(key) = &self.key {
            write!(f, "entry '{}': ", key)?;
        }
        f.write_str(&self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(StorageError::corruption("expected a JSON object").is_fatal());
        assert!(!StorageError::unwritable("disk full").is_fatal());
        assert!(!StorageError::io(
            StorageErrorCode::StorageReadFailed,
            "permission denied",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        )
        .is_fatal());
    }

    #[test]
    fn test_display_names_entry_and_source() {
        let err = StorageError::corruption("unknown class 'Ghost'").at_key("User.1");
        assert_eq!(
            err.to_string(),
            "[FATAL] MODELSHELL_DATA_CORRUPTION: entry 'User.1': unknown class 'Ghost'"
        );
        assert_eq!(err.key(), Some("User.1"));

        let err = StorageError::io(
            StorageErrorCode::StorageWriteFailed,
            "Failed to commit snapshot",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(
            err.to_string(),
            "[ERROR] MODELSHELL_STORAGE_WRITE_FAILED: Failed to commit snapshot: disk full"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}

//! Error types for CidGate
//!
//! Provides a unified error type for all CidGate operations.

use thiserror::Error;

/// Result type alias for CidGate operations
pub type Result<T> = std::result::Result<T, CidGateError>;

/// Unified error type for CidGate
#[derive(Error, Debug)]
pub enum CidGateError {
    // ===== Block Store Errors =====
    #[error("Block not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ===== DAG Errors =====
    #[error("Path component '{0}' not found")]
    PathNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Node {0} is not a readable file")]
    NotAFile(String),

    #[error("Node {0} is not a directory")]
    NotADirectory(String),

    #[error("Invalid directory: duplicate entry '{0}'")]
    InvalidDirectory(String),

    #[error("Malformed node bytes: {0}")]
    Malformed(String),

    #[error("Invalid CID: {0}")]
    InvalidCid(String),

    // ===== Naming Errors =====
    #[error("Not authorized to update name '{0}'")]
    Unauthorized(String),

    #[error("Name not registered: {0}")]
    NotRegistered(String),

    #[error("Naming error: {0}")]
    Naming(String),

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CidGateError {
    fn from(err: serde_json::Error) -> Self {
        CidGateError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CidGateError::PathNotFound("images".to_string());
        assert_eq!(err.to_string(), "Path component 'images' not found");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CidGateError = io_err.into();
        assert!(matches!(err, CidGateError::Io(_)));
    }
}

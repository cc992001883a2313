//! Store error types
//!
//! Errors reported by the auth and document-store backends.

use thiserror::Error;

/// Errors that can occur when talking to the document store or auth backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Document does not exist where one was required
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound("users/abc".to_string());
        assert_eq!(err.to_string(), "Document not found: users/abc");

        let err = StoreError::Unavailable("offline".to_string());
        assert_eq!(err.to_string(), "Store unavailable: offline");

        let err = StoreError::Serialization("bad field".to_string());
        assert_eq!(err.to_string(), "Serialization error: bad field");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}

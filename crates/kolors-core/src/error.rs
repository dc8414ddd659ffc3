//! Error types for Kolors.
//!
//! Position and combination operations report caller mistakes as
//! `InvalidArgument`/`Validation`, missing rows as the `*NotFound` variants,
//! and storage failures as `Database`. The migration engine never surfaces
//! these to its caller; it folds them into a `MigrationResult` instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Kolors library.
#[derive(Debug, Error)]
pub enum KolorsError {
    // Caller errors
    #[error("Invalid argument {field}: {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Invalid hexadecimal color format: {value}")]
    InvalidHexColor { value: String },

    // Lookup errors
    #[error("Combination not found with ID: {id}")]
    CombinationNotFound { id: i64 },

    #[error("No color found at position {position} in combination {combination_id}")]
    ColorNotFound { combination_id: i64, position: u32 },

    // Migration errors
    #[error("Failed to transform legacy record {legacy_id}: {message}")]
    RecordTransform { legacy_id: i64, message: String },

    #[error("Failed to read legacy records: {message}")]
    Fetch { message: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Kolors operations.
pub type Result<T> = std::result::Result<T, KolorsError>;

impl From<std::io::Error> for KolorsError {
    fn from(err: std::io::Error) -> Self {
        KolorsError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for KolorsError {
    fn from(err: serde_json::Error) -> Self {
        KolorsError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for KolorsError {
    fn from(err: rusqlite::Error) -> Self {
        KolorsError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl KolorsError {
    /// Shorthand for an `InvalidArgument` error.
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        KolorsError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        KolorsError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32002: Combination or color not found
    /// - -32003: Migration failure
    /// - -32005: Validation error
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            KolorsError::InvalidArgument { .. } => -32602,

            KolorsError::CombinationNotFound { .. } | KolorsError::ColorNotFound { .. } => -32002,

            KolorsError::RecordTransform { .. } | KolorsError::Fetch { .. } => -32003,

            KolorsError::Validation { .. } | KolorsError::InvalidHexColor { .. } => -32005,

            // All other errors are internal errors
            _ => -32603,
        }
    }

    /// Check if this error is the caller's fault rather than the system's.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            KolorsError::InvalidArgument { .. }
                | KolorsError::Validation { .. }
                | KolorsError::InvalidHexColor { .. }
                | KolorsError::CombinationNotFound { .. }
                | KolorsError::ColorNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KolorsError::CombinationNotFound { id: 42 };
        assert_eq!(err.to_string(), "Combination not found with ID: 42");

        let err = KolorsError::Validation {
            errors: vec!["name too short".into(), "too many colors".into()],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: name too short; too many colors"
        );
    }

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(
            KolorsError::invalid_argument("combination_id", "cannot be empty").to_rpc_error_code(),
            -32602
        );
        assert_eq!(
            KolorsError::ColorNotFound {
                combination_id: 1,
                position: 3
            }
            .to_rpc_error_code(),
            -32002
        );
        assert_eq!(
            KolorsError::Other("boom".into()).to_rpc_error_code(),
            -32603
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(KolorsError::InvalidHexColor { value: "GG".into() }.is_client_error());
        assert!(!KolorsError::Fetch {
            message: "disk gone".into()
        }
        .is_client_error());
    }
}

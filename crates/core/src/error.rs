//! Error types for the Frosty prompt builder.
//!
//! This module defines a unified error enum that covers all error categories
//! in the workspace: configuration, I/O, table naming, data sources,
//! credentials, and prompt rendering.

use thiserror::Error;

/// Unified error type for Frosty.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// Library code never panics; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Qualified table name does not have the `database.schema.table` shape
    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Warehouse, SQLite, or spreadsheet fetch errors
    #[error("Source error: {0}")]
    Source(String),

    /// Credential loading, refresh, or authorization errors
    #[error("Auth error: {0}")]
    Auth(String),

    /// Prompt profile and template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_table_name_message() {
        let err = AppError::InvalidTableName {
            name: "NBA.STATS".to_string(),
            reason: "expected 3 parts, found 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid table name 'NBA.STATS': expected 3 parts, found 2"
        );
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}

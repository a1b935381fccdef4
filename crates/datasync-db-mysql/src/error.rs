//! Error types for the MySQL target catalog.

use std::fmt::Debug;

use datasync_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// Errors specific to the MySQL target catalog.
#[derive(Debug, thiserror::Error)]
pub enum MysqlError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Pool error.
    #[error("Pool error: {message}")]
    Pool { message: String },
}

impl MysqlError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new pool error.
    #[must_use]
    pub fn pool(message: impl Into<String>) -> Self {
        Self::Pool {
            message: message.into(),
        }
    }
}

impl From<MysqlError> for StorageError {
    fn from(err: MysqlError) -> Self {
        match err {
            MysqlError::Connection(e) => StorageError::connection_error(e.to_string()),
            MysqlError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
            MysqlError::Pool { message } => {
                StorageError::connection_error(format!("Pool error: {message}"))
            }
        }
    }
}

/// Logs a failed statement with its parameters and converts the driver error.
pub(crate) fn query_failed(statement: &str, params: impl Debug, err: SqlxError) -> StorageError {
    let params = format!("{params:?}");
    tracing::error!(statement, params = %params, error = %err, "Statement failed");
    match err {
        SqlxError::Io(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed => {
            StorageError::connection_error(err.to_string())
        }
        other => StorageError::query_error(statement, params, other.to_string()),
    }
}

/// Result type alias for MySQL operations.
pub type Result<T> = std::result::Result<T, MysqlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use datasync_storage::ErrorCategory;

    #[test]
    fn test_error_display() {
        let err = MysqlError::config("invalid URL");
        assert!(err.to_string().contains("Configuration error"));

        let err = MysqlError::pool("pool exhausted");
        assert!(err.to_string().contains("Pool error"));
    }

    #[test]
    fn test_conversion_to_storage_error() {
        let storage_err: StorageError = MysqlError::config("test error").into();
        assert!(matches!(storage_err, StorageError::Internal { .. }));

        let storage_err: StorageError = MysqlError::pool("closed").into();
        assert_eq!(storage_err.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn test_query_failed_keeps_statement_and_params() {
        let err = query_failed(
            "DELETE FROM Proposal WHERE proposalId = ?",
            (7,),
            SqlxError::RowNotFound,
        );
        match err {
            StorageError::QueryError {
                statement, params, ..
            } => {
                assert_eq!(statement, "DELETE FROM Proposal WHERE proposalId = ?");
                assert_eq!(params, "(7,)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err = query_failed("SELECT 1", (), SqlxError::PoolTimedOut);
        assert_eq!(err.category(), ErrorCategory::Infrastructure);
    }
}

//! Storage error types for the catalog abstraction layer.
//!
//! Every collaborator call returns these errors. The reconciliation engine
//! never retries them; a failing call aborts the remainder of its pass.

use std::fmt;

/// Errors that can occur during catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A row the caller required was not present.
    #[error("Not found: {entity} {key}")]
    NotFound {
        /// The table or entity that was searched.
        entity: String,
        /// The key that was looked up.
        key: String,
    },

    /// A statement failed. Carries the statement and its rendered parameters.
    #[error("Query failed: {statement} [{params}]: {message}")]
    QueryError {
        statement: String,
        params: String,
        message: String,
    },

    /// A row could not be decoded into its record type.
    #[error("Invalid {entity} row: {message}")]
    InvalidRow {
        /// The record kind being decoded.
        entity: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// A multi-statement mutation could not be committed as a unit.
    #[error("Transaction failed: {message}")]
    TransactionError { message: String },

    /// The catalog could not be reached or opened.
    #[error("Catalog unavailable: {message}")]
    ConnectionError { message: String },

    #[error("Internal catalog error: {message}")]
    Internal { message: String },
}

impl StorageError {
    #[must_use]
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn query_error(
        statement: impl Into<String>,
        params: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueryError {
            statement: statement.into(),
            params: params.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_row(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRow {
            entity: entity.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// A required row was absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Coarse classification used as a structured log field.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::QueryError { .. } => ErrorCategory::Query,
            Self::InvalidRow { .. } => ErrorCategory::Validation,
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<datasync_core::CoreError> for StorageError {
    fn from(err: datasync_core::CoreError) -> Self {
        Self::invalid_row("record", err.to_string())
    }
}

/// Categories of storage errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Query,
    Validation,
    Transaction,
    Infrastructure,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Query => write!(f, "query"),
            Self::Validation => write!(f, "validation"),
            Self::Transaction => write!(f, "transaction"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("Proposal", "nt20");
        assert_eq!(err.to_string(), "Not found: Proposal nt20");

        let err = StorageError::query_error("DELETE FROM Proposal WHERE proposalId = ?", "7", "lock wait timeout");
        assert_eq!(
            err.to_string(),
            "Query failed: DELETE FROM Proposal WHERE proposalId = ? [7]: lock wait timeout"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(StorageError::not_found("Person", "x").is_not_found());
        assert!(!StorageError::internal("boom").is_not_found());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::connection_error("refused").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            StorageError::invalid_row("Session", "bad guid").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::transaction_error("rollback").category(),
            ErrorCategory::Transaction
        );
        assert_eq!(ErrorCategory::Query.to_string(), "query");
    }

    #[test]
    fn test_from_core_error() {
        let core = datasync_core::CoreError::malformed_name("visit", "cm1");
        let err: StorageError = core.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}

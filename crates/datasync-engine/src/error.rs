use datasync_core::EntityKind;
use datasync_storage::{ErrorCategory, StorageError};
use thiserror::Error;

/// Errors that abort a reconciliation pass.
///
/// Record-local problems (malformed names, unresolvable foreign identities)
/// never surface here; they are logged and counted as skipped.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{kind} pass aborted: {source}")]
    Storage {
        kind: EntityKind,
        #[source]
        source: StorageError,
    },
}

impl ReconcileError {
    /// Create a new Storage error for the pass of the given kind
    #[must_use]
    pub fn storage(kind: EntityKind, source: StorageError) -> Self {
        Self::Storage { kind, source }
    }

    /// Entity kind of the aborted pass.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Storage { kind, .. } => *kind,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Storage { source, .. } => source.category(),
        }
    }
}

/// Result type alias for reconciliation runs
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_names_the_pass() {
        let err = ReconcileError::storage(
            EntityKind::Sessions,
            StorageError::connection_error("server has gone away"),
        );
        assert_eq!(err.kind(), EntityKind::Sessions);
        assert_eq!(err.category(), ErrorCategory::Infrastructure);
        assert!(err.to_string().starts_with("sessions pass aborted"));
    }
}

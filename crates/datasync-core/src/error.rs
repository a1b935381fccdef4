use thiserror::Error;

/// Core error types for datasync record handling
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed {kind} name: {value:?}")]
    MalformedName { kind: &'static str, value: String },

    #[error("Invalid external id {value:?}: {source}")]
    InvalidExternalId {
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),
}

impl CoreError {
    /// Create a new MalformedName error
    pub fn malformed_name(kind: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedName {
            kind,
            value: value.into(),
        }
    }

    /// Create a new InvalidExternalId error
    pub fn invalid_external_id(value: impl Into<String>, source: uuid::Error) -> Self {
        Self::InvalidExternalId {
            value: value.into(),
            source,
        }
    }

    /// Returns `true` for errors that only affect a single record.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::MalformedName { .. } | Self::InvalidExternalId { .. }
        )
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_name_display() {
        let err = CoreError::malformed_name("visit", "cm12345");
        assert_eq!(err.to_string(), "Malformed visit name: \"cm12345\"");
        assert!(err.is_record_local());
    }

    #[test]
    fn test_unknown_kind_is_not_record_local() {
        let err = CoreError::UnknownKind("shipments".into());
        assert!(!err.is_record_local());
    }
}

//! External identity handling.
//!
//! Both systems store the source GUID as 16 raw bytes and exchange it as a
//! hex string (`rawtohex` on the source side, `hex()` on the target side).
//! [`ExternalId`] parses either rendering and always prints the canonical
//! upper-case, dash-less form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Durable cross-system identifier tying a target record to its source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(Uuid);

impl ExternalId {
    /// Parses a hex GUID, accepting upper or lower case and optional dashes.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|e| CoreError::invalid_external_id(value, e))
    }

    /// Parses an optional column value; SQL `NULL` and empty strings yield `None`.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>, CoreError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => Self::parse(v).map(Some),
        }
    }

    /// Returns the canonical hex rendering used in SQL `unhex(?)` parameters.
    pub fn to_hex(&self) -> String {
        self.0.as_simple().encode_upper(&mut Uuid::encode_buffer()).to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ExternalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for ExternalId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExternalId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render_upper_hex() {
        let id = ExternalId::parse("99017eb35bd34e55e04017ac41627aff").unwrap();
        assert_eq!(id.to_string(), "99017EB35BD34E55E04017AC41627AFF");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = ExternalId::parse("99017EB35BD34E55E04017AC41627AFF").unwrap();
        let b = ExternalId::parse("99017eb35bd34e55e04017ac41627aff").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(ExternalId::parse_optional(None).unwrap(), None);
        assert_eq!(ExternalId::parse_optional(Some("")).unwrap(), None);
        assert!(
            ExternalId::parse_optional(Some("E70E7EB35BD34E55E04017AC41627FFB"))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let err = ExternalId::parse("not-a-guid").unwrap_err();
        assert!(matches!(err, CoreError::InvalidExternalId { .. }));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = ExternalId::parse("E70E7EB35BD34E55E04017AC41627FFB").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"E70E7EB35BD34E55E04017AC41627FFB\"");
        let back: ExternalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

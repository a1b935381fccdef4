//! Source datasets loaded from fixture files.

use std::path::{Path, PathBuf};

use datasync_core::{
    SourceComponent, SourcePerson, SourceProposal, SourceProposalPerson, SourceSession,
    SourceSessionPerson, SourceSessionType,
};
use datasync_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML fixture {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid JSON fixture {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported fixture format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

impl From<FixtureError> for StorageError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::Io { .. } => StorageError::connection_error(err.to_string()),
            _ => StorageError::invalid_row("fixture", err.to_string()),
        }
    }
}

/// Every table the source catalog serves.
///
/// Session participants are stored once; the per-session and per-person
/// cascade lookups are derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceDataset {
    pub proposals: Vec<SourceProposal>,
    pub sessions: Vec<SourceSession>,
    pub persons: Vec<SourcePerson>,
    pub components: Vec<SourceComponent>,
    pub session_types: Vec<SourceSessionType>,
    pub proposal_has_person: Vec<SourceProposalPerson>,
    pub session_has_person: Vec<SourceSessionPerson>,
}

impl SourceDataset {
    /// Loads a dataset, picking the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|source| FixtureError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            Some("json") => serde_json::from_str(&content).map_err(|source| FixtureError::Json {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(FixtureError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = r#"
[[proposals]]
name = "nt20"
external_id = "99017EB35BD34E55E04017AC41627AFF"
title = "Software testing"
state = "Open"

[[sessions]]
external_id = "E70E7EB35BD34E55E04017AC41627FFB"
visit_id = "nt20-1"
beamline = "i03"
start_date = "2024-03-01T09:00:00"
end_date = "2024-03-02T09:00:00"
state = "Queued"
"#;

    #[test]
    fn test_load_toml_fixture() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let dataset = SourceDataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.proposals.len(), 1);
        assert_eq!(dataset.proposals[0].name, "nt20");
        assert_eq!(dataset.sessions.len(), 1);
        assert!(dataset.sessions[0].state.is_queued());
        assert!(dataset.persons.is_empty());
    }

    #[test]
    fn test_load_json_fixture() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"persons": [{"external_id": "0B1E3A2C4D5E6F708192A3B4C5D6E7F8", "login": "abc12345"}]}"#)
            .unwrap();

        let dataset = SourceDataset::from_path(file.path()).unwrap();
        assert_eq!(dataset.persons.len(), 1);
        assert_eq!(dataset.persons[0].login.as_deref(), Some("abc12345"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = SourceDataset::from_path(file.path()).unwrap_err();
        assert!(matches!(err, FixtureError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_is_connection_error() {
        let err = SourceDataset::from_path("/nonexistent/datasync/fixture.toml").unwrap_err();
        let storage: StorageError = err.into();
        assert_eq!(
            storage.category(),
            datasync_storage::ErrorCategory::Infrastructure
        );
    }
}

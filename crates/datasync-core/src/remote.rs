use serde::{Deserialize, Serialize};

/// Whether a participant attends a session remotely.
///
/// The two systems encode this in opposite directions: the source stores an
/// `on_site` flag (`0` means remote) and the target stores a `remote` flag
/// (`1` means remote). Anything else is unknown on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RemoteFlag {
    Remote,
    OnSite,
    #[default]
    Unknown,
}

impl RemoteFlag {
    pub fn from_source_on_site(on_site: Option<i64>) -> Self {
        match on_site {
            Some(0) => RemoteFlag::Remote,
            Some(1) => RemoteFlag::OnSite,
            _ => RemoteFlag::Unknown,
        }
    }

    pub fn from_target(remote: Option<i64>) -> Self {
        match remote {
            Some(1) => RemoteFlag::Remote,
            Some(0) => RemoteFlag::OnSite,
            _ => RemoteFlag::Unknown,
        }
    }

    /// Value for the target's `remote` column.
    pub fn to_db(self) -> Option<i64> {
        match self {
            RemoteFlag::Remote => Some(1),
            RemoteFlag::OnSite => Some(0),
            RemoteFlag::Unknown => None,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a source entity (proposal, session or component)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Open,
    Closed,
    Cancelled,
    Queued,
    Accepted,
    #[serde(untagged)]
    Other(String),
}

impl LifecycleState {
    /// A terminal state never produces an insert; a matched counterpart is
    /// deleted or left untouched.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Cancelled)
    }

    /// Queued sessions are stored as unscheduled in the target.
    pub fn is_queued(&self) -> bool {
        matches!(self, LifecycleState::Queued)
    }

    /// Components are only propagated while accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, LifecycleState::Accepted)
    }

    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Open => "Open",
            LifecycleState::Closed => "Closed",
            LifecycleState::Cancelled => "Cancelled",
            LifecycleState::Queued => "Queued",
            LifecycleState::Accepted => "Accepted",
            LifecycleState::Other(s) => s,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Open" => LifecycleState::Open,
            "Closed" => LifecycleState::Closed,
            "Cancelled" => LifecycleState::Cancelled,
            "Queued" => LifecycleState::Queued,
            "Accepted" => LifecycleState::Accepted,
            other => LifecycleState::Other(other.to_string()),
        })
    }
}

impl From<&str> for LifecycleState {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cancelled_is_terminal() {
        assert!(LifecycleState::Cancelled.is_terminal());
        for state in ["Open", "Closed", "Queued", "Accepted", "Scheduled"] {
            assert!(!LifecycleState::from(state).is_terminal(), "{state}");
        }
    }

    #[test]
    fn test_unknown_state_is_preserved() {
        let state = LifecycleState::from("In Review");
        assert_eq!(state, LifecycleState::Other("In Review".into()));
        assert_eq!(state.to_string(), "In Review");
    }

    #[test]
    fn test_serde_untagged_other() {
        let state: LifecycleState = serde_json::from_str("\"Queued\"").unwrap();
        assert!(state.is_queued());
        let other: LifecycleState = serde_json::from_str("\"Submitted\"").unwrap();
        assert_eq!(other, LifecycleState::Other("Submitted".into()));
    }
}

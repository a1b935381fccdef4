use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Entity kinds reconciled by datasync, one pass each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Proposals,
    Sessions,
    SessionTypes,
    Persons,
    ProposalHasPerson,
    SessionHasPerson,
    Components,
}

impl EntityKind {
    /// Default pass order. Parents precede the associations that reference them.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Proposals,
        EntityKind::Sessions,
        EntityKind::SessionTypes,
        EntityKind::Persons,
        EntityKind::ProposalHasPerson,
        EntityKind::SessionHasPerson,
        EntityKind::Components,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Proposals => "proposals",
            EntityKind::Sessions => "sessions",
            EntityKind::SessionTypes => "session_types",
            EntityKind::Persons => "persons",
            EntityKind::ProposalHasPerson => "proposal_has_person",
            EntityKind::SessionHasPerson => "session_has_person",
            EntityKind::Components => "components",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("shipments".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let kind: EntityKind = serde_json::from_str("\"session_has_person\"").unwrap();
        assert_eq!(kind, EntityKind::SessionHasPerson);
    }
}

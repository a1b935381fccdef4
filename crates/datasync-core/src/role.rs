//! Role translation between the source and target vocabularies.
//!
//! The source system uses upper-case tokens such as `TEAM_LEADER`; the target
//! stores human-readable strings such as `"Team Leader"`. Translation is a
//! total function: tokens outside the table map to [`TargetRole::Unknown`],
//! which is stored as SQL `NULL`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role string as stored by the target system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRole {
    PrincipalInvestigator,
    AlternateContact,
    TeamLeader,
    TeamMember,
    LocalContact,
    LocalContact2,
    CoInvestigator,
    DataAccess,
    Unknown,
}

impl TargetRole {
    /// Value written to the target's role column. `Unknown` is stored as `NULL`.
    pub fn as_db_value(&self) -> Option<&'static str> {
        match self {
            TargetRole::PrincipalInvestigator => Some("Principal Investigator"),
            TargetRole::AlternateContact => Some("Alternate Contact"),
            TargetRole::TeamLeader => Some("Team Leader"),
            TargetRole::TeamMember => Some("Team Member"),
            TargetRole::LocalContact => Some("Local Contact"),
            TargetRole::LocalContact2 => Some("Local Contact 2"),
            TargetRole::CoInvestigator => Some("Co-Investigator"),
            TargetRole::DataAccess => Some("Data Access"),
            TargetRole::Unknown => None,
        }
    }

    /// Reads a role back from the target's column value.
    pub fn from_db_value(value: Option<&str>) -> Self {
        match value {
            Some("Principal Investigator") => TargetRole::PrincipalInvestigator,
            Some("Alternate Contact") => TargetRole::AlternateContact,
            Some("Team Leader") => TargetRole::TeamLeader,
            Some("Team Member") => TargetRole::TeamMember,
            Some("Local Contact") => TargetRole::LocalContact,
            Some("Local Contact 2") => TargetRole::LocalContact2,
            Some("Co-Investigator") => TargetRole::CoInvestigator,
            Some("Data Access") => TargetRole::DataAccess,
            _ => TargetRole::Unknown,
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_value().unwrap_or("unknown"))
    }
}

/// Translates a source role token into the target vocabulary.
pub fn translate_role(token: &str) -> TargetRole {
    match token {
        "PRINCIPAL_INVESTIGATOR" => TargetRole::PrincipalInvestigator,
        "ALTERNATE_CONTACT" => TargetRole::AlternateContact,
        "TEAM_LEADER" => TargetRole::TeamLeader,
        "TEAM_MEMBER" => TargetRole::TeamMember,
        "LOCAL_CONTACT" | "LOCAL_CONTACT_1ST" => TargetRole::LocalContact,
        "LOCAL_CONTACT_2ND" => TargetRole::LocalContact2,
        "CO_INVESTIGATOR" => TargetRole::CoInvestigator,
        "DATA_ACCESS" => TargetRole::DataAccess,
        _ => TargetRole::Unknown,
    }
}

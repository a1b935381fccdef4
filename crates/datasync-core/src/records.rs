//! Per-kind extract records.
//!
//! Each kind has a source shape (rows pulled from the upstream catalog) and a
//! target shape (rows pulled from the downstream store). Target rows carry the
//! numeric primary key the mutation calls need; source rows carry the
//! lifecycle state that drives the insert/delete decision.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::id::ExternalId;
use crate::state::LifecycleState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProposal {
    /// Lower-case `code` + `number`, e.g. `nt20`.
    pub name: String,
    pub external_id: ExternalId,
    pub title: Option<String>,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProposal {
    pub name: String,
    pub external_id: Option<ExternalId>,
    pub title: Option<String>,
    pub proposal_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSession {
    pub external_id: ExternalId,
    /// Lower-case visit name, e.g. `cm12345-6`.
    pub visit_id: String,
    pub beamline: Option<String>,
    pub comments: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub state: LifecycleState,
    pub beamline_operator: Option<String>,
}

impl SourceSession {
    /// Scheduled flag derived from the lifecycle state.
    pub fn scheduled(&self) -> bool {
        !self.state.is_queued()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSession {
    pub external_id: Option<ExternalId>,
    pub visit_id: String,
    pub beamline: Option<String>,
    pub comments: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub session_id: i64,
    pub beamline_operator: Option<String>,
    pub scheduled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePerson {
    pub external_id: ExternalId,
    /// Lower-case federal id.
    pub login: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPerson {
    pub external_id: Option<ExternalId>,
    pub login: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub person_id: i64,
}

/// Sample component (a protein in the target schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceComponent {
    pub external_id: ExternalId,
    pub proposal_external_id: ExternalId,
    pub name: Option<String>,
    pub acronym: String,
    pub state: LifecycleState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetComponent {
    pub external_id: Option<ExternalId>,
    pub proposal_external_id: Option<ExternalId>,
    pub name: Option<String>,
    pub acronym: Option<String>,
    pub protein_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSessionType {
    pub session_external_id: ExternalId,
    pub type_name: String,
    pub visit_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSessionType {
    pub session_external_id: Option<ExternalId>,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProposalPerson {
    pub proposal_external_id: ExternalId,
    pub person_external_id: ExternalId,
    /// Source role token, e.g. `PRINCIPAL_INVESTIGATOR`.
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProposalPerson {
    pub proposal_external_id: ExternalId,
    pub person_external_id: ExternalId,
    /// Stored role string, e.g. `Principal Investigator`.
    pub role: Option<String>,
    pub proposal_id: i64,
    pub person_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSessionPerson {
    pub session_external_id: ExternalId,
    pub person_external_id: ExternalId,
    pub role: String,
    /// `0` remote, `1` on site.
    pub on_site: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSessionPerson {
    pub session_external_id: ExternalId,
    pub person_external_id: ExternalId,
    pub role: Option<String>,
    pub session_id: i64,
    pub person_id: i64,
    /// `1` remote, `0` on site.
    pub remote: Option<i64>,
}

/// Person attached to a session, as returned for a cascading session insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionParticipant {
    pub person_external_id: ExternalId,
    pub role: String,
    pub on_site: Option<i64>,
    pub login: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Session attached to a person, as returned for a cascading person insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSession {
    pub session_external_id: ExternalId,
    pub role: String,
    pub on_site: Option<i64>,
}

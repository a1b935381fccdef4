//! Mutation payloads accepted by [`TargetCatalog`](crate::TargetCatalog).

use chrono::NaiveDateTime;
use datasync_core::{ExternalId, RemoteFlag, TargetRole};
use serde::{Deserialize, Serialize};

/// Protein type recorded for components created by datasync.
pub const PROTEIN_ORIGIN: &str = "ORIGIN:UAS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub code: String,
    pub number: u32,
    pub title: Option<String>,
    pub external_id: ExternalId,
}

/// Overwrites the title and external id of a proposal. The code is renamed
/// through its own call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalUpdate {
    pub title: Option<String>,
    pub external_id: ExternalId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub proposal_id: i64,
    pub visit_number: u32,
    pub external_id: ExternalId,
    pub beamline: Option<String>,
    pub comments: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub beamline_operator: Option<String>,
    pub scheduled: bool,
}

/// Fields overwritten on a matched session. Comments and the visit number are
/// never part of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub external_id: ExternalId,
    pub beamline: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub beamline_operator: Option<String>,
    pub scheduled: bool,
}

/// Person columns written on insert and on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
    pub external_id: ExternalId,
    pub login: Option<String>,
    pub title: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProtein {
    pub proposal_id: i64,
    pub external_id: ExternalId,
    pub name: Option<String>,
    pub acronym: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPersonLink {
    pub proposal_id: i64,
    pub person_id: i64,
    pub role: TargetRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPersonLink {
    pub session_id: i64,
    pub person_id: i64,
    pub role: TargetRole,
    pub remote: RemoteFlag,
}

/// Result of a guarded session delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    Deleted,
    /// The session still had dependent rows and was left in place.
    Retained,
}

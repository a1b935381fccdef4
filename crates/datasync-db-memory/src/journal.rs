use datasync_core::ExternalId;
use datasync_storage::{
    NewProposal, NewProtein, NewSession, PersonFields, ProposalPersonLink, ProposalUpdate,
    SessionPersonLink, SessionUpdate,
};
use serde::Serialize;

/// One mutation call received by [`InMemoryTarget`](crate::InMemoryTarget).
///
/// Lookups and extracts are not journaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Mutation {
    InsertProposal(NewProposal),
    UpdateProposalCode { proposal_id: i64, code: String },
    UpdateProposal { proposal_id: i64, update: ProposalUpdate },
    DeleteProposal { proposal_id: i64 },
    InsertSession(NewSession),
    UpdateSession { session_id: i64, update: SessionUpdate },
    DeleteSession { session_id: i64, deleted: bool },
    InsertSessionType { session_id: i64, type_name: String },
    InsertPerson(PersonFields),
    UpdatePerson { person_id: i64, person: PersonFields },
    InsertProtein(NewProtein),
    UpdateProteinExternalId { protein_id: i64, external_id: Option<ExternalId> },
    UpdateProteinName { protein_id: i64, name: String },
    InsertProposalHasPerson(ProposalPersonLink),
    UpdateProposalHasPerson(ProposalPersonLink),
    InsertSessionHasPerson(SessionPersonLink),
    UpdateSessionHasPerson(SessionPersonLink),
}

impl Mutation {
    /// Returns `true` for calls that create rows.
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            Self::InsertProposal(_)
                | Self::InsertSession(_)
                | Self::InsertSessionType { .. }
                | Self::InsertPerson(_)
                | Self::InsertProtein(_)
                | Self::InsertProposalHasPerson(_)
                | Self::InsertSessionHasPerson(_)
        )
    }

    /// Returns `true` for calls that remove rows.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::DeleteProposal { .. } | Self::DeleteSession { .. })
    }
}

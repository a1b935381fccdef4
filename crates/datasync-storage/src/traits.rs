//! Catalog traits for the reconciliation engine.
//!
//! A [`SourceCatalog`] is the upstream system of record; a [`TargetCatalog`]
//! is the downstream store that datasync keeps in step with it. Both return
//! full, ordered extracts; the engine materializes them before matching.

use async_trait::async_trait;
use datasync_core::{
    ExternalId, PersonSession, SessionParticipant, SourceComponent, SourcePerson, SourceProposal,
    SourceProposalPerson, SourceSession, SourceSessionPerson, SourceSessionType, TargetComponent,
    TargetPerson, TargetProposal, TargetProposalPerson, TargetSession, TargetSessionPerson,
    TargetSessionType,
};

use crate::error::StorageError;
use crate::types::{
    DeleteOutcome, NewProposal, NewProtein, NewSession, PersonFields, ProposalPersonLink,
    ProposalUpdate, SessionPersonLink, SessionUpdate,
};

/// Read-only access to the upstream catalog.
///
/// Implementations apply their own "active only" filtering; every extract is
/// returned in the order the engine should process it.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// Name of the backend, used in log lines.
    fn backend_name(&self) -> &'static str;

    /// Proposals ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure issues.
    async fn extract_proposals(&self) -> Result<Vec<SourceProposal>, StorageError>;

    /// Sessions ordered by visit name.
    async fn extract_sessions(&self) -> Result<Vec<SourceSession>, StorageError>;

    /// Persons ordered by login.
    async fn extract_persons(&self) -> Result<Vec<SourcePerson>, StorageError>;

    /// Sample components with their owning proposal.
    async fn extract_components(&self) -> Result<Vec<SourceComponent>, StorageError>;

    /// Session type tags.
    async fn extract_session_types(&self) -> Result<Vec<SourceSessionType>, StorageError>;

    /// Proposal participants for open and closed proposals, ordered by
    /// proposal then person so duplicate pairs are adjacent.
    async fn extract_proposal_has_person(
        &self,
    ) -> Result<Vec<SourceProposalPerson>, StorageError>;

    /// Session participants for non-cancelled sessions that ended less than
    /// `min_age_days` ago, ordered by session then person.
    async fn extract_session_has_person(
        &self,
        min_age_days: u32,
    ) -> Result<Vec<SourceSessionPerson>, StorageError>;

    /// Participants of one session, ordered by person.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure issues. An unknown session yields
    /// an empty list.
    async fn retrieve_persons_for_session(
        &self,
        session: &ExternalId,
    ) -> Result<Vec<SessionParticipant>, StorageError>;

    /// Non-cancelled sessions of one person, ordered by session.
    async fn retrieve_sessions_for_person(
        &self,
        person: &ExternalId,
    ) -> Result<Vec<PersonSession>, StorageError>;
}

/// Read/write access to the downstream store.
///
/// Lookups return `Ok(None)` for missing rows; only infrastructure failures
/// are errors.
#[async_trait]
pub trait TargetCatalog: Send + Sync {
    /// Name of the backend, used in log lines.
    fn backend_name(&self) -> &'static str;

    // ==================== Extracts ====================

    async fn extract_proposals(&self) -> Result<Vec<TargetProposal>, StorageError>;

    async fn extract_sessions(&self) -> Result<Vec<TargetSession>, StorageError>;

    async fn extract_persons(&self) -> Result<Vec<TargetPerson>, StorageError>;

    async fn extract_components(&self) -> Result<Vec<TargetComponent>, StorageError>;

    async fn extract_session_types(&self) -> Result<Vec<TargetSessionType>, StorageError>;

    async fn extract_proposal_has_person(
        &self,
    ) -> Result<Vec<TargetProposalPerson>, StorageError>;

    /// Session participants for sessions that ended less than
    /// `min_age_days + 1` days ago.
    async fn extract_session_has_person(
        &self,
        min_age_days: u32,
    ) -> Result<Vec<TargetSessionPerson>, StorageError>;

    // ==================== Proposals ====================

    /// Inserts a proposal and returns its new id.
    async fn insert_proposal(&self, proposal: &NewProposal) -> Result<i64, StorageError>;

    async fn update_proposal_code(&self, proposal_id: i64, code: &str)
    -> Result<(), StorageError>;

    async fn update_proposal(
        &self,
        proposal_id: i64,
        update: &ProposalUpdate,
    ) -> Result<(), StorageError>;

    /// Deletes a proposal together with its person associations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the delete cannot be
    /// committed; no partial delete is left behind.
    async fn delete_proposal(&self, proposal_id: i64) -> Result<(), StorageError>;

    async fn retrieve_proposal_id(
        &self,
        code: &str,
        number: u32,
    ) -> Result<Option<i64>, StorageError>;

    async fn retrieve_proposal_id_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError>;

    // ==================== Sessions ====================

    async fn insert_session(&self, session: &NewSession) -> Result<i64, StorageError>;

    async fn update_session(
        &self,
        session_id: i64,
        update: &SessionUpdate,
    ) -> Result<(), StorageError>;

    /// Returns `true` when any collected data or logistics row references the
    /// session.
    async fn has_dependent_data(&self, session_id: i64) -> Result<bool, StorageError>;

    /// Deletes a session unless it has dependent data. The check and the
    /// delete are a single atomic operation.
    async fn delete_session(&self, session_id: i64) -> Result<DeleteOutcome, StorageError>;

    async fn retrieve_session_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError>;

    async fn insert_session_type(
        &self,
        session_id: i64,
        type_name: &str,
    ) -> Result<(), StorageError>;

    // ==================== Persons ====================

    async fn insert_person(&self, person: &PersonFields) -> Result<i64, StorageError>;

    async fn update_person(
        &self,
        person_id: i64,
        person: &PersonFields,
    ) -> Result<(), StorageError>;

    async fn retrieve_person_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError>;

    // ==================== Components ====================

    async fn insert_protein(&self, protein: &NewProtein) -> Result<i64, StorageError>;

    /// Links (`Some`) or unlinks (`None`) a protein from its source component.
    async fn update_protein_external_id(
        &self,
        protein_id: i64,
        external_id: Option<&ExternalId>,
    ) -> Result<(), StorageError>;

    async fn update_protein_name(&self, protein_id: i64, name: &str)
    -> Result<(), StorageError>;

    async fn count_proteins_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<i64, StorageError>;

    async fn count_proteins_for_proposal_and_acronym(
        &self,
        proposal: &ExternalId,
        acronym: &str,
    ) -> Result<i64, StorageError>;

    // ==================== Associations ====================

    async fn insert_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError>;

    async fn update_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError>;

    async fn insert_session_has_person(&self, link: &SessionPersonLink)
    -> Result<(), StorageError>;

    async fn update_session_has_person(&self, link: &SessionPersonLink)
    -> Result<(), StorageError>;
}

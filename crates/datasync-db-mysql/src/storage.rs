//! MySQL implementation of the [`TargetCatalog`] trait.

use async_trait::async_trait;
use datasync_core::{
    ExternalId, TargetComponent, TargetPerson, TargetProposal, TargetProposalPerson,
    TargetSession, TargetSessionPerson, TargetSessionType,
};
use datasync_storage::{
    DeleteOutcome, NewProposal, NewProtein, NewSession, PersonFields, ProposalPersonLink,
    ProposalUpdate, SessionPersonLink, SessionUpdate, StorageError, TargetCatalog,
};
use sqlx_mysql::MySqlPool;

use crate::config::MysqlConfig;
use crate::pool;
use crate::queries::{associations, entities, extract};

/// Target catalog backed by the downstream MySQL/MariaDB schema.
///
/// The pool is owned here and closed when the catalog is dropped or
/// [`IspybTarget::close`] is called.
#[derive(Debug, Clone)]
pub struct IspybTarget {
    pool: MySqlPool,
}

impl IspybTarget {
    /// Creates a new `IspybTarget` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the connection
    /// pool cannot be created.
    pub async fn new(config: MysqlConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;
        pool::test_connection(&pool).await?;
        Ok(Self { pool })
    }

    /// Creates a new `IspybTarget` from an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Waits for checked-out connections to return and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TargetCatalog for IspybTarget {
    fn backend_name(&self) -> &'static str {
        "mysql"
    }

    async fn extract_proposals(&self) -> Result<Vec<TargetProposal>, StorageError> {
        extract::proposals(&self.pool).await
    }

    async fn extract_sessions(&self) -> Result<Vec<TargetSession>, StorageError> {
        extract::sessions(&self.pool).await
    }

    async fn extract_persons(&self) -> Result<Vec<TargetPerson>, StorageError> {
        extract::persons(&self.pool).await
    }

    async fn extract_components(&self) -> Result<Vec<TargetComponent>, StorageError> {
        extract::components(&self.pool).await
    }

    async fn extract_session_types(&self) -> Result<Vec<TargetSessionType>, StorageError> {
        extract::session_types(&self.pool).await
    }

    async fn extract_proposal_has_person(
        &self,
    ) -> Result<Vec<TargetProposalPerson>, StorageError> {
        extract::proposal_has_person(&self.pool).await
    }

    async fn extract_session_has_person(
        &self,
        min_age_days: u32,
    ) -> Result<Vec<TargetSessionPerson>, StorageError> {
        extract::session_has_person(&self.pool, min_age_days).await
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> Result<i64, StorageError> {
        entities::insert_proposal(&self.pool, proposal).await
    }

    async fn update_proposal_code(
        &self,
        proposal_id: i64,
        code: &str,
    ) -> Result<(), StorageError> {
        entities::update_proposal_code(&self.pool, proposal_id, code).await
    }

    async fn update_proposal(
        &self,
        proposal_id: i64,
        update: &ProposalUpdate,
    ) -> Result<(), StorageError> {
        entities::update_proposal(&self.pool, proposal_id, update).await
    }

    async fn delete_proposal(&self, proposal_id: i64) -> Result<(), StorageError> {
        entities::delete_proposal(&self.pool, proposal_id).await
    }

    async fn retrieve_proposal_id(
        &self,
        code: &str,
        number: u32,
    ) -> Result<Option<i64>, StorageError> {
        entities::proposal_id(&self.pool, code, number).await
    }

    async fn retrieve_proposal_id_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        entities::proposal_id_for_external_id(&self.pool, external_id).await
    }

    async fn insert_session(&self, session: &NewSession) -> Result<i64, StorageError> {
        entities::insert_session(&self.pool, session).await
    }

    async fn update_session(
        &self,
        session_id: i64,
        update: &SessionUpdate,
    ) -> Result<(), StorageError> {
        entities::update_session(&self.pool, session_id, update).await
    }

    async fn has_dependent_data(&self, session_id: i64) -> Result<bool, StorageError> {
        entities::has_dependent_data(&self.pool, session_id).await
    }

    async fn delete_session(&self, session_id: i64) -> Result<DeleteOutcome, StorageError> {
        entities::delete_session(&self.pool, session_id).await
    }

    async fn retrieve_session_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        entities::session_id(&self.pool, external_id).await
    }

    async fn insert_session_type(
        &self,
        session_id: i64,
        type_name: &str,
    ) -> Result<(), StorageError> {
        entities::insert_session_type(&self.pool, session_id, type_name).await
    }

    async fn insert_person(&self, person: &PersonFields) -> Result<i64, StorageError> {
        entities::insert_person(&self.pool, person).await
    }

    async fn update_person(
        &self,
        person_id: i64,
        person: &PersonFields,
    ) -> Result<(), StorageError> {
        entities::update_person(&self.pool, person_id, person).await
    }

    async fn retrieve_person_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        entities::person_id(&self.pool, external_id).await
    }

    async fn insert_protein(&self, protein: &NewProtein) -> Result<i64, StorageError> {
        entities::insert_protein(&self.pool, protein).await
    }

    async fn update_protein_external_id(
        &self,
        protein_id: i64,
        external_id: Option<&ExternalId>,
    ) -> Result<(), StorageError> {
        entities::update_protein_external_id(&self.pool, protein_id, external_id).await
    }

    async fn update_protein_name(
        &self,
        protein_id: i64,
        name: &str,
    ) -> Result<(), StorageError> {
        entities::update_protein_name(&self.pool, protein_id, name).await
    }

    async fn count_proteins_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<i64, StorageError> {
        entities::count_proteins_for_external_id(&self.pool, external_id).await
    }

    async fn count_proteins_for_proposal_and_acronym(
        &self,
        proposal: &ExternalId,
        acronym: &str,
    ) -> Result<i64, StorageError> {
        entities::count_proteins_for_proposal_and_acronym(&self.pool, proposal, acronym).await
    }

    async fn insert_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError> {
        associations::insert_proposal_has_person(&self.pool, link).await
    }

    async fn update_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError> {
        associations::update_proposal_has_person(&self.pool, link).await
    }

    async fn insert_session_has_person(
        &self,
        link: &SessionPersonLink,
    ) -> Result<(), StorageError> {
        associations::insert_session_has_person(&self.pool, link).await
    }

    async fn update_session_has_person(
        &self,
        link: &SessionPersonLink,
    ) -> Result<(), StorageError> {
        associations::update_session_has_person(&self.pool, link).await
    }
}

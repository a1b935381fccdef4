use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use datasync_core::{
    ExternalId, LifecycleState, PersonSession, SessionParticipant, SourceComponent, SourcePerson,
    SourceProposal, SourceProposalPerson, SourceSession, SourceSessionPerson, SourceSessionType,
};
use datasync_storage::{SourceCatalog, StorageError};
use tokio::sync::RwLock;

use crate::fixture::{FixtureError, SourceDataset};

/// Source catalog backed by an in-memory [`SourceDataset`].
///
/// Applies the same filtering and ordering the upstream queries do, so the
/// engine sees identical extract shapes in dry runs and tests.
#[derive(Debug, Default)]
pub struct FixtureSource {
    data: RwLock<SourceDataset>,
}

impl FixtureSource {
    pub fn new(dataset: SourceDataset) -> Self {
        Self {
            data: RwLock::new(dataset),
        }
    }

    /// Loads the dataset from a `.toml` or `.json` fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let dataset = SourceDataset::from_path(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            proposals = dataset.proposals.len(),
            sessions = dataset.sessions.len(),
            persons = dataset.persons.len(),
            "Loaded source fixture"
        );
        Ok(Self::new(dataset))
    }

    /// Replaces the dataset, e.g. to simulate upstream edits between runs.
    pub async fn replace(&self, dataset: SourceDataset) {
        *self.data.write().await = dataset;
    }

    /// Applies an in-place edit to the dataset.
    pub async fn edit(&self, f: impl FnOnce(&mut SourceDataset)) {
        let mut data = self.data.write().await;
        f(&mut *data);
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }
}

fn proposal_is_live(data: &SourceDataset, id: &ExternalId) -> bool {
    data.proposals.iter().any(|p| {
        &p.external_id == id && matches!(p.state, LifecycleState::Open | LifecycleState::Closed)
    })
}

/// Visits such as `ab-1` belong to facility-internal pseudo proposals.
fn has_short_code(visit_id: &str) -> bool {
    visit_id.chars().nth(2) == Some('-')
}

fn session_state<'a>(data: &'a SourceDataset, id: &ExternalId) -> Option<&'a SourceSession> {
    data.sessions.iter().find(|s| &s.external_id == id)
}

#[async_trait]
impl SourceCatalog for FixtureSource {
    fn backend_name(&self) -> &'static str {
        "fixture"
    }

    /// Draft, submitted and rejected proposals never leave the user office.
    async fn extract_proposals(&self) -> Result<Vec<SourceProposal>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .proposals
            .iter()
            .filter(|p| {
                matches!(
                    p.state,
                    LifecycleState::Open | LifecycleState::Closed | LifecycleState::Cancelled
                )
            })
            .cloned()
            .collect())
    }

    async fn extract_sessions(&self) -> Result<Vec<SourceSession>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .sessions
            .iter()
            .filter(|s| !has_short_code(&s.visit_id))
            .cloned()
            .collect())
    }

    async fn extract_persons(&self) -> Result<Vec<SourcePerson>, StorageError> {
        Ok(self.data.read().await.persons.clone())
    }

    /// Components of open or closed proposals that carry both a name and an
    /// acronym.
    async fn extract_components(&self) -> Result<Vec<SourceComponent>, StorageError> {
        let data = self.data.read().await;
        Ok(data
            .components
            .iter()
            .filter(|c| proposal_is_live(&data, &c.proposal_external_id))
            .filter(|c| c.name.as_deref().is_some_and(|n| !n.trim().is_empty()))
            .filter(|c| !c.acronym.trim().is_empty())
            .cloned()
            .collect())
    }

    async fn extract_session_types(&self) -> Result<Vec<SourceSessionType>, StorageError> {
        Ok(self.data.read().await.session_types.clone())
    }

    async fn extract_proposal_has_person(
        &self,
    ) -> Result<Vec<SourceProposalPerson>, StorageError> {
        let data = self.data.read().await;
        let mut rows: Vec<_> = data
            .proposal_has_person
            .iter()
            .filter(|row| proposal_is_live(&data, &row.proposal_external_id))
            .cloned()
            .collect();
        // Stable sort keeps the dataset's role order within a pair.
        rows.sort_by_key(|row| (row.proposal_external_id, row.person_external_id));
        Ok(rows)
    }

    async fn extract_session_has_person(
        &self,
        min_age_days: u32,
    ) -> Result<Vec<SourceSessionPerson>, StorageError> {
        let cutoff = Self::now() - Duration::days(i64::from(min_age_days));
        let data = self.data.read().await;
        let mut rows: Vec<_> = data
            .session_has_person
            .iter()
            .filter(|row| {
                session_state(&data, &row.session_external_id).is_some_and(|s| {
                    !s.state.is_terminal() && s.end_date.is_some_and(|end| end > cutoff)
                })
            })
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.session_external_id, row.person_external_id));
        Ok(rows)
    }

    async fn retrieve_persons_for_session(
        &self,
        session: &ExternalId,
    ) -> Result<Vec<SessionParticipant>, StorageError> {
        let data = self.data.read().await;
        let mut rows: Vec<_> = data
            .session_has_person
            .iter()
            .filter(|row| &row.session_external_id == session)
            .map(|row| {
                let person = data
                    .persons
                    .iter()
                    .find(|p| p.external_id == row.person_external_id);
                SessionParticipant {
                    person_external_id: row.person_external_id,
                    role: row.role.clone(),
                    on_site: row.on_site,
                    login: person.and_then(|p| p.login.clone()),
                    title: person.and_then(|p| p.title.clone()),
                    given_name: person.and_then(|p| p.given_name.clone()),
                    family_name: person.and_then(|p| p.family_name.clone()),
                }
            })
            .collect();
        rows.sort_by_key(|row| row.person_external_id);
        Ok(rows)
    }

    async fn retrieve_sessions_for_person(
        &self,
        person: &ExternalId,
    ) -> Result<Vec<PersonSession>, StorageError> {
        let data = self.data.read().await;
        let mut rows: Vec<_> = data
            .session_has_person
            .iter()
            .filter(|row| &row.person_external_id == person)
            .filter(|row| {
                session_state(&data, &row.session_external_id)
                    .is_some_and(|s| !s.state.is_terminal())
            })
            .map(|row| PersonSession {
                session_external_id: row.session_external_id,
                role: row.role.clone(),
                on_site: row.on_site,
            })
            .collect();
        rows.sort_by_key(|row| row.session_external_id);
        Ok(rows)
    }
}

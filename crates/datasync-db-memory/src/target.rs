use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Local};
use datasync_core::{
    ExternalId, TargetComponent, TargetPerson, TargetProposal, TargetProposalPerson,
    TargetSession, TargetSessionPerson, TargetSessionType,
};
use datasync_storage::{
    DeleteOutcome, NewProposal, NewProtein, NewSession, PROTEIN_ORIGIN, PersonFields,
    ProposalPersonLink, ProposalUpdate, SessionPersonLink, SessionUpdate, StorageError,
    TargetCatalog,
};
use tokio::sync::RwLock;

use crate::journal::Mutation;

#[derive(Debug, Clone)]
struct ProposalRow {
    proposal_id: i64,
    code: String,
    number: u32,
    title: Option<String>,
    external_id: Option<ExternalId>,
}

#[derive(Debug, Clone)]
struct SessionRow {
    session_id: i64,
    proposal_id: i64,
    visit_number: u32,
    external_id: Option<ExternalId>,
    beamline: Option<String>,
    comments: Option<String>,
    start_date: Option<chrono::NaiveDateTime>,
    end_date: Option<chrono::NaiveDateTime>,
    beamline_operator: Option<String>,
    scheduled: Option<bool>,
}

#[derive(Debug, Clone)]
struct PersonRow {
    person_id: i64,
    external_id: Option<ExternalId>,
    login: Option<String>,
    title: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

#[derive(Debug, Clone)]
struct ProteinRow {
    protein_id: i64,
    proposal_id: i64,
    external_id: Option<ExternalId>,
    name: Option<String>,
    acronym: Option<String>,
    protein_type: &'static str,
}

#[derive(Debug, Clone)]
struct ProposalPersonRow {
    proposal_id: i64,
    person_id: i64,
    role: Option<String>,
}

#[derive(Debug, Clone)]
struct SessionPersonRow {
    session_id: i64,
    person_id: i64,
    role: Option<String>,
    remote: Option<i64>,
}

#[derive(Debug, Default)]
struct Tables {
    proposals: Vec<ProposalRow>,
    sessions: Vec<SessionRow>,
    session_types: Vec<(i64, String)>,
    persons: Vec<PersonRow>,
    proteins: Vec<ProteinRow>,
    proposal_has_person: Vec<ProposalPersonRow>,
    session_has_person: Vec<SessionPersonRow>,
    /// Sessions referenced by collected data or logistics rows.
    dependent: HashSet<i64>,
    last_id: i64,
    journal: Vec<Mutation>,
    /// Mutations still allowed before every further one fails.
    fail_after: Option<usize>,
}

impl Tables {
    /// Journals a mutation, or fails it when the fault budget is spent.
    /// A failed mutation is neither journaled nor applied.
    fn record(&mut self, mutation: Mutation) -> Result<(), StorageError> {
        match self.fail_after {
            Some(0) => Err(StorageError::connection_error(format!(
                "connection lost before {mutation:?}"
            ))),
            remaining => {
                self.fail_after = remaining.map(|n| n - 1);
                self.journal.push(mutation);
                Ok(())
            }
        }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn proposal(&self, proposal_id: i64) -> Option<&ProposalRow> {
        self.proposals.iter().find(|p| p.proposal_id == proposal_id)
    }

    fn session(&self, session_id: i64) -> Option<&SessionRow> {
        self.sessions.iter().find(|s| s.session_id == session_id)
    }

    /// Association extracts only include persons with a login.
    fn logged_in_person(&self, person_id: i64) -> Option<&PersonRow> {
        self.persons
            .iter()
            .find(|p| p.person_id == person_id && p.login.is_some())
    }

    fn proposal_mut(&mut self, proposal_id: i64) -> Result<&mut ProposalRow, StorageError> {
        self.proposals
            .iter_mut()
            .find(|p| p.proposal_id == proposal_id)
            .ok_or_else(|| StorageError::not_found("Proposal", proposal_id.to_string()))
    }

    fn session_mut(&mut self, session_id: i64) -> Result<&mut SessionRow, StorageError> {
        self.sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| StorageError::not_found("BLSession", session_id.to_string()))
    }

    fn protein_mut(&mut self, protein_id: i64) -> Result<&mut ProteinRow, StorageError> {
        self.proteins
            .iter_mut()
            .find(|p| p.protein_id == protein_id)
            .ok_or_else(|| StorageError::not_found("Protein", protein_id.to_string()))
    }
}

/// Target catalog modelling the downstream tables in memory.
///
/// Every mutation call is appended to a journal before it is applied, so a
/// test can assert on the exact calls the engine made.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    tables: RwLock<Tables>,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the mutation journal.
    pub async fn journal(&self) -> Vec<Mutation> {
        self.tables.read().await.journal.clone()
    }

    /// Drains the mutation journal.
    pub async fn take_journal(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.tables.write().await.journal)
    }

    /// Lets the next `count` mutations succeed and fails every one after
    /// them with a connection error, as a dropped database link would.
    pub async fn fail_mutations_after(&self, count: usize) {
        self.tables.write().await.fail_after = Some(count);
    }

    /// Marks a session as referenced by collected data, so it can no longer
    /// be deleted.
    pub async fn mark_dependent_data(&self, session_id: i64) {
        self.tables.write().await.dependent.insert(session_id);
    }

    /// Overwrites a session's comments outside the engine, as a target-side
    /// user would.
    pub async fn set_session_comments(
        &self,
        session_id: i64,
        comments: Option<String>,
    ) -> Result<(), StorageError> {
        self.tables.write().await.session_mut(session_id)?.comments = comments;
        Ok(())
    }

    /// Returns the protein type recorded for a protein.
    pub async fn protein_type(&self, protein_id: i64) -> Option<&'static str> {
        self.tables
            .read()
            .await
            .proteins
            .iter()
            .find(|p| p.protein_id == protein_id)
            .map(|p| p.protein_type)
    }
}

#[async_trait]
impl TargetCatalog for InMemoryTarget {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn extract_proposals(&self) -> Result<Vec<TargetProposal>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposals
            .iter()
            .map(|p| TargetProposal {
                name: format!("{}{}", p.code, p.number),
                external_id: p.external_id,
                title: p.title.clone(),
                proposal_id: p.proposal_id,
            })
            .collect())
    }

    async fn extract_sessions(&self) -> Result<Vec<TargetSession>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .filter_map(|s| {
                let proposal = tables.proposal(s.proposal_id)?;
                Some(TargetSession {
                    external_id: s.external_id,
                    visit_id: format!("{}{}-{}", proposal.code, proposal.number, s.visit_number),
                    beamline: s.beamline.clone(),
                    comments: s.comments.clone(),
                    start_date: s.start_date,
                    end_date: s.end_date,
                    session_id: s.session_id,
                    beamline_operator: s.beamline_operator.clone(),
                    scheduled: s.scheduled,
                })
            })
            .collect())
    }

    async fn extract_persons(&self) -> Result<Vec<TargetPerson>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .persons
            .iter()
            .filter(|p| p.login.is_some())
            .map(|p| TargetPerson {
                external_id: p.external_id,
                login: p.login.as_deref().map(str::to_lowercase),
                title: p.title.clone(),
                given_name: p.given_name.clone(),
                family_name: p.family_name.clone(),
                person_id: p.person_id,
            })
            .collect())
    }

    async fn extract_components(&self) -> Result<Vec<TargetComponent>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proteins
            .iter()
            .map(|p| TargetComponent {
                external_id: p.external_id,
                proposal_external_id: tables.proposal(p.proposal_id).and_then(|pr| pr.external_id),
                name: p.name.clone(),
                acronym: p.acronym.clone(),
                protein_id: p.protein_id,
            })
            .collect())
    }

    async fn extract_session_types(&self) -> Result<Vec<TargetSessionType>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .session_types
            .iter()
            .map(|(session_id, type_name)| TargetSessionType {
                session_external_id: tables.session(*session_id).and_then(|s| s.external_id),
                type_name: type_name.clone(),
            })
            .collect())
    }

    async fn extract_proposal_has_person(
        &self,
    ) -> Result<Vec<TargetProposalPerson>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposal_has_person
            .iter()
            .filter_map(|row| {
                Some(TargetProposalPerson {
                    proposal_external_id: tables.proposal(row.proposal_id)?.external_id?,
                    person_external_id: tables.logged_in_person(row.person_id)?.external_id?,
                    role: row.role.clone(),
                    proposal_id: row.proposal_id,
                    person_id: row.person_id,
                })
            })
            .collect())
    }

    async fn extract_session_has_person(
        &self,
        min_age_days: u32,
    ) -> Result<Vec<TargetSessionPerson>, StorageError> {
        let cutoff = Local::now().naive_local() - Duration::days(i64::from(min_age_days) + 1);
        let tables = self.tables.read().await;
        Ok(tables
            .session_has_person
            .iter()
            .filter_map(|row| {
                let session = tables.session(row.session_id)?;
                if !session.end_date.is_some_and(|end| end > cutoff) {
                    return None;
                }
                Some(TargetSessionPerson {
                    session_external_id: session.external_id?,
                    person_external_id: tables.logged_in_person(row.person_id)?.external_id?,
                    role: row.role.clone(),
                    session_id: row.session_id,
                    person_id: row.person_id,
                    remote: row.remote,
                })
            })
            .collect())
    }

    async fn insert_proposal(&self, proposal: &NewProposal) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertProposal(proposal.clone()))?;
        let proposal_id = tables.next_id();
        tables.proposals.push(ProposalRow {
            proposal_id,
            code: proposal.code.clone(),
            number: proposal.number,
            title: proposal.title.clone(),
            external_id: Some(proposal.external_id),
        });
        Ok(proposal_id)
    }

    async fn update_proposal_code(
        &self,
        proposal_id: i64,
        code: &str,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateProposalCode {
            proposal_id,
            code: code.to_string(),
        })?;
        tables.proposal_mut(proposal_id)?.code = code.to_string();
        Ok(())
    }

    async fn update_proposal(
        &self,
        proposal_id: i64,
        update: &ProposalUpdate,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateProposal {
            proposal_id,
            update: update.clone(),
        })?;
        let row = tables.proposal_mut(proposal_id)?;
        row.title = update.title.clone();
        row.external_id = Some(update.external_id);
        Ok(())
    }

    async fn delete_proposal(&self, proposal_id: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::DeleteProposal { proposal_id })?;
        tables
            .proposal_has_person
            .retain(|row| row.proposal_id != proposal_id);
        tables.proposals.retain(|p| p.proposal_id != proposal_id);
        Ok(())
    }

    async fn retrieve_proposal_id(
        &self,
        code: &str,
        number: u32,
    ) -> Result<Option<i64>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposals
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code) && p.number == number)
            .map(|p| p.proposal_id))
    }

    async fn retrieve_proposal_id_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposals
            .iter()
            .find(|p| p.external_id.as_ref() == Some(external_id))
            .map(|p| p.proposal_id))
    }

    async fn insert_session(&self, session: &NewSession) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertSession(session.clone()))?;
        if tables.proposal(session.proposal_id).is_none() {
            return Err(StorageError::not_found(
                "Proposal",
                session.proposal_id.to_string(),
            ));
        }
        let session_id = tables.next_id();
        tables.sessions.push(SessionRow {
            session_id,
            proposal_id: session.proposal_id,
            visit_number: session.visit_number,
            external_id: Some(session.external_id),
            beamline: session.beamline.clone(),
            comments: session.comments.clone(),
            start_date: session.start_date,
            end_date: session.end_date,
            beamline_operator: session.beamline_operator.clone(),
            scheduled: Some(session.scheduled),
        });
        Ok(session_id)
    }

    async fn update_session(
        &self,
        session_id: i64,
        update: &SessionUpdate,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateSession {
            session_id,
            update: update.clone(),
        })?;
        let row = tables.session_mut(session_id)?;
        row.external_id = Some(update.external_id);
        row.beamline = update.beamline.clone();
        row.start_date = update.start_date;
        row.end_date = update.end_date;
        row.beamline_operator = update.beamline_operator.clone();
        row.scheduled = Some(update.scheduled);
        Ok(())
    }

    async fn has_dependent_data(&self, session_id: i64) -> Result<bool, StorageError> {
        Ok(self.tables.read().await.dependent.contains(&session_id))
    }

    async fn delete_session(&self, session_id: i64) -> Result<DeleteOutcome, StorageError> {
        let mut tables = self.tables.write().await;
        let retained = tables.dependent.contains(&session_id);
        tables.record(Mutation::DeleteSession {
            session_id,
            deleted: !retained,
        })?;
        if retained {
            return Ok(DeleteOutcome::Retained);
        }
        tables
            .session_has_person
            .retain(|row| row.session_id != session_id);
        tables.session_types.retain(|(id, _)| *id != session_id);
        tables.sessions.retain(|s| s.session_id != session_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn retrieve_session_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.external_id.as_ref() == Some(external_id))
            .map(|s| s.session_id))
    }

    async fn insert_session_type(
        &self,
        session_id: i64,
        type_name: &str,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertSessionType {
            session_id,
            type_name: type_name.to_string(),
        })?;
        tables.session_types.push((session_id, type_name.to_string()));
        Ok(())
    }

    async fn insert_person(&self, person: &PersonFields) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertPerson(person.clone()))?;
        let person_id = tables.next_id();
        tables.persons.push(PersonRow {
            person_id,
            external_id: Some(person.external_id),
            login: person.login.clone(),
            title: person.title.clone(),
            given_name: person.given_name.clone(),
            family_name: person.family_name.clone(),
        });
        Ok(person_id)
    }

    async fn update_person(
        &self,
        person_id: i64,
        person: &PersonFields,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdatePerson {
            person_id,
            person: person.clone(),
        })?;
        let row = tables
            .persons
            .iter_mut()
            .find(|p| p.person_id == person_id)
            .ok_or_else(|| StorageError::not_found("Person", person_id.to_string()))?;
        row.external_id = Some(person.external_id);
        row.login = person.login.clone();
        row.title = person.title.clone();
        row.given_name = person.given_name.clone();
        row.family_name = person.family_name.clone();
        Ok(())
    }

    async fn retrieve_person_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<i64>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .persons
            .iter()
            .find(|p| p.external_id.as_ref() == Some(external_id))
            .map(|p| p.person_id))
    }

    async fn insert_protein(&self, protein: &NewProtein) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertProtein(protein.clone()))?;
        let protein_id = tables.next_id();
        tables.proteins.push(ProteinRow {
            protein_id,
            proposal_id: protein.proposal_id,
            external_id: Some(protein.external_id),
            name: protein.name.clone(),
            acronym: Some(protein.acronym.clone()),
            protein_type: PROTEIN_ORIGIN,
        });
        Ok(protein_id)
    }

    async fn update_protein_external_id(
        &self,
        protein_id: i64,
        external_id: Option<&ExternalId>,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateProteinExternalId {
            protein_id,
            external_id: external_id.copied(),
        })?;
        tables.protein_mut(protein_id)?.external_id = external_id.copied();
        Ok(())
    }

    async fn update_protein_name(
        &self,
        protein_id: i64,
        name: &str,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateProteinName {
            protein_id,
            name: name.to_string(),
        })?;
        tables.protein_mut(protein_id)?.name = Some(name.to_string());
        Ok(())
    }

    async fn count_proteins_for_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<i64, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proteins
            .iter()
            .filter(|p| p.external_id.as_ref() == Some(external_id))
            .count() as i64)
    }

    async fn count_proteins_for_proposal_and_acronym(
        &self,
        proposal: &ExternalId,
        acronym: &str,
    ) -> Result<i64, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .proteins
            .iter()
            .filter(|p| p.acronym.as_deref() == Some(acronym))
            .filter(|p| {
                tables
                    .proposal(p.proposal_id)
                    .is_some_and(|pr| pr.external_id.as_ref() == Some(proposal))
            })
            .count() as i64)
    }

    async fn insert_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertProposalHasPerson(link.clone()))?;
        let exists = tables
            .proposal_has_person
            .iter()
            .any(|row| row.proposal_id == link.proposal_id && row.person_id == link.person_id);
        if !exists {
            tables.proposal_has_person.push(ProposalPersonRow {
                proposal_id: link.proposal_id,
                person_id: link.person_id,
                role: link.role.as_db_value().map(str::to_string),
            });
        }
        Ok(())
    }

    async fn update_proposal_has_person(
        &self,
        link: &ProposalPersonLink,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateProposalHasPerson(link.clone()))?;
        for row in tables
            .proposal_has_person
            .iter_mut()
            .filter(|row| row.proposal_id == link.proposal_id && row.person_id == link.person_id)
        {
            row.role = link.role.as_db_value().map(str::to_string);
        }
        Ok(())
    }

    async fn insert_session_has_person(
        &self,
        link: &SessionPersonLink,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::InsertSessionHasPerson(link.clone()))?;
        let exists = tables
            .session_has_person
            .iter()
            .any(|row| row.session_id == link.session_id && row.person_id == link.person_id);
        if !exists {
            tables.session_has_person.push(SessionPersonRow {
                session_id: link.session_id,
                person_id: link.person_id,
                role: link.role.as_db_value().map(str::to_string),
                remote: link.remote.to_db(),
            });
        }
        Ok(())
    }

    async fn update_session_has_person(
        &self,
        link: &SessionPersonLink,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables.record(Mutation::UpdateSessionHasPerson(link.clone()))?;
        for row in tables
            .session_has_person
            .iter_mut()
            .filter(|row| row.session_id == link.session_id && row.person_id == link.person_id)
        {
            row.role = link.role.as_db_value().map(str::to_string);
            row.remote = link.remote.to_db();
        }
        Ok(())
    }
}

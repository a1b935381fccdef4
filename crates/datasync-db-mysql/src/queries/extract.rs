//! Full-table extracts of the target schema.

use datasync_core::{
    TargetComponent, TargetPerson, TargetProposal, TargetProposalPerson, TargetSession,
    TargetSessionPerson, TargetSessionType,
};
use datasync_storage::StorageError;
use sqlx_core::query_as::query_as;
use sqlx_mysql::MySqlPool;
use tracing::debug;

use crate::error::query_failed;
use crate::rows::{
    self, ComponentRow, PersonRow, ProposalPersonRow, ProposalRow, SessionPersonRow, SessionRow,
    SessionTypeRow,
};

const PROPOSALS: &str = r#"
SELECT CAST(CONCAT(proposalCode, proposalNumber) AS CHAR), hex(externalId), title,
       CAST(proposalId AS SIGNED)
FROM Proposal
ORDER BY CONCAT(proposalCode, proposalNumber)"#;

const SESSIONS: &str = r#"
SELECT hex(s.externalId),
       CAST(CONCAT(p.proposalCode, p.proposalNumber, '-', s.visit_number) AS CHAR),
       s.beamLineName, s.comments, s.startDate, s.endDate,
       CAST(s.sessionId AS SIGNED), s.beamLineOperator, CAST(s.scheduled AS SIGNED)
FROM Proposal p INNER JOIN BLSession s ON p.proposalId = s.proposalId
ORDER BY p.proposalNumber, p.proposalCode, s.visit_number"#;

const PERSONS: &str = r#"
SELECT hex(externalId), lower(login), title, givenName, familyName, CAST(personId AS SIGNED)
FROM Person
WHERE login IS NOT NULL"#;

const COMPONENTS: &str = r#"
SELECT hex(prot.externalId), hex(p.externalId), prot.name, prot.acronym,
       CAST(prot.proteinId AS SIGNED)
FROM Proposal p INNER JOIN Protein prot ON p.proposalId = prot.proposalId
ORDER BY CONCAT(p.proposalCode, p.proposalNumber), prot.name, prot.acronym"#;

const SESSION_TYPES: &str = r#"
SELECT hex(bs.externalId), st.typeName
FROM SessionType st INNER JOIN BLSession bs ON st.sessionId = bs.sessionId"#;

const PROPOSAL_HAS_PERSON: &str = r#"
SELECT hex(pr.externalId), hex(pe.externalId), php.role,
       CAST(php.proposalId AS SIGNED), CAST(php.personId AS SIGNED)
FROM ProposalHasPerson php
  INNER JOIN Proposal pr ON pr.proposalId = php.proposalId
  INNER JOIN Person pe ON pe.personId = php.personId
WHERE pe.login IS NOT NULL
  AND pr.externalId IS NOT NULL
  AND pe.externalId IS NOT NULL"#;

const SESSION_HAS_PERSON: &str = r#"
SELECT hex(bs.externalId), hex(p.externalId), shp.role,
       CAST(shp.sessionId AS SIGNED), CAST(shp.personId AS SIGNED),
       CAST(shp.remote AS SIGNED)
FROM Session_has_Person shp
  INNER JOIN BLSession bs ON bs.sessionId = shp.sessionId
  INNER JOIN Person p ON p.personId = shp.personId
WHERE bs.endDate > SUBDATE(NOW(), INTERVAL ? DAY)
  AND p.login IS NOT NULL
  AND bs.externalId IS NOT NULL
  AND p.externalId IS NOT NULL"#;

pub async fn proposals(pool: &MySqlPool) -> Result<Vec<TargetProposal>, StorageError> {
    let rows: Vec<ProposalRow> = query_as(PROPOSALS)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(PROPOSALS, (), e))?;
    debug!(rows = rows.len(), "Proposals: target returns rows");
    rows.into_iter().map(rows::proposal).collect()
}

pub async fn sessions(pool: &MySqlPool) -> Result<Vec<TargetSession>, StorageError> {
    let rows: Vec<SessionRow> = query_as(SESSIONS)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(SESSIONS, (), e))?;
    debug!(rows = rows.len(), "Sessions: target returns rows");
    rows.into_iter().map(rows::session).collect()
}

pub async fn persons(pool: &MySqlPool) -> Result<Vec<TargetPerson>, StorageError> {
    let rows: Vec<PersonRow> = query_as(PERSONS)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(PERSONS, (), e))?;
    debug!(rows = rows.len(), "Persons: target returns rows");
    rows.into_iter().map(rows::person).collect()
}

pub async fn components(pool: &MySqlPool) -> Result<Vec<TargetComponent>, StorageError> {
    let rows: Vec<ComponentRow> = query_as(COMPONENTS)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(COMPONENTS, (), e))?;
    debug!(rows = rows.len(), "Components: target returns rows");
    rows.into_iter().map(rows::component).collect()
}

pub async fn session_types(pool: &MySqlPool) -> Result<Vec<TargetSessionType>, StorageError> {
    let rows: Vec<SessionTypeRow> = query_as(SESSION_TYPES)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(SESSION_TYPES, (), e))?;
    debug!(rows = rows.len(), "Session types: target returns rows");
    rows.into_iter().map(rows::session_type).collect()
}

pub async fn proposal_has_person(
    pool: &MySqlPool,
) -> Result<Vec<TargetProposalPerson>, StorageError> {
    let rows: Vec<ProposalPersonRow> = query_as(PROPOSAL_HAS_PERSON)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(PROPOSAL_HAS_PERSON, (), e))?;
    debug!(rows = rows.len(), "Proposal - Persons: target returns rows");
    rows.into_iter().map(rows::proposal_person).collect()
}

/// Session participants for sessions that ended less than
/// `min_age_days + 1` days ago.
pub async fn session_has_person(
    pool: &MySqlPool,
    min_age_days: u32,
) -> Result<Vec<TargetSessionPerson>, StorageError> {
    let window = i64::from(min_age_days) + 1;
    let rows: Vec<SessionPersonRow> = query_as(SESSION_HAS_PERSON)
        .bind(window)
        .fetch_all(pool)
        .await
        .map_err(|e| query_failed(SESSION_HAS_PERSON, (window,), e))?;
    debug!(rows = rows.len(), "Session - Persons: target returns rows");
    rows.into_iter().map(rows::session_person).collect()
}

//! Mutations and id lookups for proposals, sessions, persons and proteins.

use std::sync::LazyLock;

use datasync_core::ExternalId;
use datasync_storage::{
    DeleteOutcome, NewProposal, NewProtein, NewSession, PROTEIN_ORIGIN, PersonFields,
    ProposalUpdate, SessionUpdate, StorageError,
};
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_mysql::{MySql, MySqlPool};
use tracing::debug;

use super::inserted_id;
use crate::error::query_failed;

// ==================== Proposals ====================

/// `Proposal.personId` is mandatory; new proposals are owned by the
/// placeholder account until the association pass runs.
const INSERT_PROPOSAL: &str = r#"
INSERT IGNORE INTO Proposal (proposalCode, proposalNumber, title, externalId, personId, blTimeStamp)
VALUES (?, ?, ?, unhex(?), 1, NOW())"#;

const UPDATE_PROPOSAL_CODE: &str = "UPDATE Proposal SET proposalCode = ? WHERE proposalId = ?";

const UPDATE_PROPOSAL: &str = r#"
UPDATE Proposal SET title = ?, blTimeStamp = NOW(), externalId = unhex(?)
WHERE proposalId = ?"#;

const DELETE_PROPOSAL_PERSONS: &str = "DELETE FROM ProposalHasPerson WHERE proposalId = ?";

const DELETE_PROPOSAL: &str = "DELETE FROM Proposal WHERE proposalId = ?";

const PROPOSAL_ID: &str = r#"
SELECT CAST(max(proposalId) AS SIGNED) FROM Proposal
WHERE proposalCode = ? AND proposalNumber = ?"#;

const PROPOSAL_ID_FOR_EXTERNAL_ID: &str =
    "SELECT CAST(max(proposalId) AS SIGNED) FROM Proposal WHERE externalId = unhex(?)";

pub async fn insert_proposal(pool: &MySqlPool, p: &NewProposal) -> Result<i64, StorageError> {
    let number = p.number.to_string();
    let ext = p.external_id.to_hex();
    let result = query(INSERT_PROPOSAL)
        .bind(&p.code)
        .bind(&number)
        .bind(&p.title)
        .bind(&ext)
        .execute(pool)
        .await
        .map_err(|e| query_failed(INSERT_PROPOSAL, (&p.code, &number, &p.title, &ext), e))?;
    match inserted_id(&result)? {
        Some(id) => Ok(id),
        None => proposal_id_for_external_id(pool, &p.external_id)
            .await?
            .ok_or_else(|| StorageError::not_found("Proposal", ext)),
    }
}

pub async fn update_proposal_code(
    pool: &MySqlPool,
    proposal_id: i64,
    code: &str,
) -> Result<(), StorageError> {
    query(UPDATE_PROPOSAL_CODE)
        .bind(code)
        .bind(proposal_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_PROPOSAL_CODE, (code, proposal_id), e))?;
    Ok(())
}

pub async fn update_proposal(
    pool: &MySqlPool,
    proposal_id: i64,
    update: &ProposalUpdate,
) -> Result<(), StorageError> {
    let ext = update.external_id.to_hex();
    query(UPDATE_PROPOSAL)
        .bind(&update.title)
        .bind(&ext)
        .bind(proposal_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_PROPOSAL, (&update.title, &ext, proposal_id), e))?;
    Ok(())
}

/// Deletes the proposal's person associations and then the proposal in one
/// transaction.
pub async fn delete_proposal(pool: &MySqlPool, proposal_id: i64) -> Result<(), StorageError> {
    let mut tx = pool.begin().await.map_err(|e| {
        StorageError::transaction_error(format!("Failed to begin transaction: {e}"))
    })?;

    query(DELETE_PROPOSAL_PERSONS)
        .bind(proposal_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| query_failed(DELETE_PROPOSAL_PERSONS, (proposal_id,), e))?;

    query(DELETE_PROPOSAL)
        .bind(proposal_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| query_failed(DELETE_PROPOSAL, (proposal_id,), e))?;

    tx.commit().await.map_err(|e| {
        StorageError::transaction_error(format!("Failed to commit transaction: {e}"))
    })?;
    Ok(())
}

pub async fn proposal_id(
    pool: &MySqlPool,
    code: &str,
    number: u32,
) -> Result<Option<i64>, StorageError> {
    let number = number.to_string();
    query_scalar(PROPOSAL_ID)
        .bind(code)
        .bind(&number)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(PROPOSAL_ID, (code, &number), e))
}

pub async fn proposal_id_for_external_id(
    pool: &MySqlPool,
    external_id: &ExternalId,
) -> Result<Option<i64>, StorageError> {
    let ext = external_id.to_hex();
    query_scalar(PROPOSAL_ID_FOR_EXTERNAL_ID)
        .bind(&ext)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(PROPOSAL_ID_FOR_EXTERNAL_ID, (&ext,), e))
}

// ==================== Sessions ====================

/// Tables whose rows pin a session: collected data, samples and logistics.
const DEPENDENT_TABLES: [(&str, &str); 12] = [
    ("DataCollectionGroup", "sessionId"),
    ("DataCollection", "SESSIONID"),
    ("EnergyScan", "sessionId"),
    ("XFEFluorescenceSpectrum", "sessionId"),
    ("ShippingHasSession", "sessionId"),
    ("SaxsDataCollection", "blsessionId"),
    ("SamplePlate", "blsessionId"),
    ("Specimen", "blsessionId"),
    ("BF_fault", "sessionId"),
    ("RobotAction", "blsessionId"),
    ("BeamlineAction", "sessionId"),
    ("Dewar", "firstExperimentId"),
];

/// One `EXISTS` clause per dependent table, each taking the session id.
fn dependent_data_condition() -> String {
    DEPENDENT_TABLES
        .iter()
        .map(|(table, column)| format!("EXISTS (SELECT 1 FROM {table} WHERE {column} = ?)"))
        .collect::<Vec<_>>()
        .join("\n   OR ")
}

static HAS_DEPENDENT_DATA: LazyLock<String> =
    LazyLock::new(|| format!("SELECT CAST(({}) AS SIGNED)", dependent_data_condition()));

static DELETE_SESSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "DELETE FROM BLSession WHERE sessionId = ? AND NOT (\n   {}\n)",
        dependent_data_condition()
    )
});

const INSERT_SESSION: &str = r#"
INSERT IGNORE INTO BLSession (proposalId, externalId, beamLineName, comments, startDate, endDate,
                              visit_number, beamLineOperator, scheduled)
VALUES (?, unhex(?), ?, ?, ?, ?, ?, ?, ?)"#;

const UPDATE_SESSION: &str = r#"
UPDATE BLSession
SET externalId = unhex(?), beamLineName = ?, startDate = ?, endDate = ?,
    beamLineOperator = ?, scheduled = ?
WHERE sessionId = ?"#;

const SESSION_ID: &str =
    "SELECT CAST(max(sessionId) AS SIGNED) FROM BLSession WHERE externalId = unhex(?)";

const INSERT_SESSION_TYPE: &str =
    "INSERT IGNORE INTO SessionType (sessionId, typeName) VALUES (?, ?)";

pub async fn insert_session(pool: &MySqlPool, s: &NewSession) -> Result<i64, StorageError> {
    let ext = s.external_id.to_hex();
    let result = query(INSERT_SESSION)
        .bind(s.proposal_id)
        .bind(&ext)
        .bind(&s.beamline)
        .bind(&s.comments)
        .bind(s.start_date)
        .bind(s.end_date)
        .bind(s.visit_number)
        .bind(&s.beamline_operator)
        .bind(s.scheduled)
        .execute(pool)
        .await
        .map_err(|e| {
            query_failed(
                INSERT_SESSION,
                (s.proposal_id, &ext, &s.beamline, s.visit_number, s.scheduled),
                e,
            )
        })?;
    match inserted_id(&result)? {
        Some(id) => Ok(id),
        None => session_id(pool, &s.external_id)
            .await?
            .ok_or_else(|| StorageError::not_found("BLSession", ext)),
    }
}

pub async fn update_session(
    pool: &MySqlPool,
    session_id: i64,
    u: &SessionUpdate,
) -> Result<(), StorageError> {
    let ext = u.external_id.to_hex();
    query(UPDATE_SESSION)
        .bind(&ext)
        .bind(&u.beamline)
        .bind(u.start_date)
        .bind(u.end_date)
        .bind(&u.beamline_operator)
        .bind(u.scheduled)
        .bind(session_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_SESSION, (&ext, &u.beamline, u.scheduled, session_id), e))?;
    Ok(())
}

pub async fn has_dependent_data(pool: &MySqlPool, session_id: i64) -> Result<bool, StorageError> {
    let mut q = query_scalar::<MySql, i64>(HAS_DEPENDENT_DATA.as_str());
    for _ in 0..DEPENDENT_TABLES.len() {
        q = q.bind(session_id);
    }
    let flag = q
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(HAS_DEPENDENT_DATA.as_str(), (session_id,), e))?;
    debug!(session_id, has_data = (flag != 0), "Checked session dependent data");
    Ok(flag != 0)
}

/// Deletes a session in a single statement that re-checks every dependent
/// table, so no row can appear between the check and the delete.
pub async fn delete_session(
    pool: &MySqlPool,
    session_id: i64,
) -> Result<DeleteOutcome, StorageError> {
    let mut q = query::<MySql>(DELETE_SESSION.as_str()).bind(session_id);
    for _ in 0..DEPENDENT_TABLES.len() {
        q = q.bind(session_id);
    }
    let result = q
        .execute(pool)
        .await
        .map_err(|e| query_failed(DELETE_SESSION.as_str(), (session_id,), e))?;
    Ok(if result.rows_affected() > 0 {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::Retained
    })
}

pub async fn session_id(
    pool: &MySqlPool,
    external_id: &ExternalId,
) -> Result<Option<i64>, StorageError> {
    let ext = external_id.to_hex();
    query_scalar(SESSION_ID)
        .bind(&ext)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(SESSION_ID, (&ext,), e))
}

pub async fn insert_session_type(
    pool: &MySqlPool,
    session_id: i64,
    type_name: &str,
) -> Result<(), StorageError> {
    query(INSERT_SESSION_TYPE)
        .bind(session_id)
        .bind(type_name)
        .execute(pool)
        .await
        .map_err(|e| query_failed(INSERT_SESSION_TYPE, (session_id, type_name), e))?;
    Ok(())
}

// ==================== Persons ====================

const INSERT_PERSON: &str = r#"
INSERT IGNORE INTO Person (externalId, login, title, givenName, familyName)
VALUES (unhex(?), ?, ?, ?, ?)"#;

const UPDATE_PERSON: &str = r#"
UPDATE Person SET externalId = unhex(?), login = ?, title = ?, givenName = ?, familyName = ?
WHERE personId = ?"#;

const PERSON_ID: &str =
    "SELECT CAST(max(personId) AS SIGNED) FROM Person WHERE externalId = unhex(?)";

pub async fn insert_person(pool: &MySqlPool, p: &PersonFields) -> Result<i64, StorageError> {
    let ext = p.external_id.to_hex();
    let result = query(INSERT_PERSON)
        .bind(&ext)
        .bind(&p.login)
        .bind(&p.title)
        .bind(&p.given_name)
        .bind(&p.family_name)
        .execute(pool)
        .await
        .map_err(|e| query_failed(INSERT_PERSON, (&ext, &p.login), e))?;
    match inserted_id(&result)? {
        Some(id) => Ok(id),
        None => person_id(pool, &p.external_id)
            .await?
            .ok_or_else(|| StorageError::not_found("Person", ext)),
    }
}

pub async fn update_person(
    pool: &MySqlPool,
    person_id: i64,
    p: &PersonFields,
) -> Result<(), StorageError> {
    let ext = p.external_id.to_hex();
    query(UPDATE_PERSON)
        .bind(&ext)
        .bind(&p.login)
        .bind(&p.title)
        .bind(&p.given_name)
        .bind(&p.family_name)
        .bind(person_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_PERSON, (&ext, &p.login, person_id), e))?;
    Ok(())
}

pub async fn person_id(
    pool: &MySqlPool,
    external_id: &ExternalId,
) -> Result<Option<i64>, StorageError> {
    let ext = external_id.to_hex();
    query_scalar(PERSON_ID)
        .bind(&ext)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(PERSON_ID, (&ext,), e))
}

// ==================== Proteins ====================

const INSERT_PROTEIN: &str = r#"
INSERT IGNORE INTO Protein (externalId, proposalId, name, acronym, proteinType)
VALUES (unhex(?), ?, ?, ?, ?)"#;

const UPDATE_PROTEIN_EXTERNAL_ID: &str =
    "UPDATE Protein SET externalId = unhex(?) WHERE proteinId = ?";

const UPDATE_PROTEIN_NAME: &str = "UPDATE Protein SET name = ? WHERE proteinId = ?";

const COUNT_PROTEINS_FOR_EXTERNAL_ID: &str =
    "SELECT count(*) FROM Protein WHERE externalId = unhex(?)";

const COUNT_PROTEINS_FOR_PROPOSAL_AND_ACRONYM: &str = r#"
SELECT count(*) FROM Protein
WHERE proposalId IN (SELECT proposalId FROM Proposal WHERE externalId = unhex(?))
  AND acronym = ?"#;

const PROTEIN_ID_FOR_EXTERNAL_ID: &str =
    "SELECT CAST(max(proteinId) AS SIGNED) FROM Protein WHERE externalId = unhex(?)";

pub async fn insert_protein(pool: &MySqlPool, p: &NewProtein) -> Result<i64, StorageError> {
    let ext = p.external_id.to_hex();
    let result = query(INSERT_PROTEIN)
        .bind(&ext)
        .bind(p.proposal_id)
        .bind(&p.name)
        .bind(&p.acronym)
        .bind(PROTEIN_ORIGIN)
        .execute(pool)
        .await
        .map_err(|e| query_failed(INSERT_PROTEIN, (&ext, p.proposal_id, &p.acronym), e))?;
    match inserted_id(&result)? {
        Some(id) => Ok(id),
        None => {
            let existing: Option<i64> = query_scalar(PROTEIN_ID_FOR_EXTERNAL_ID)
                .bind(&ext)
                .fetch_one(pool)
                .await
                .map_err(|e| query_failed(PROTEIN_ID_FOR_EXTERNAL_ID, (&ext,), e))?;
            existing.ok_or_else(|| StorageError::not_found("Protein", ext))
        }
    }
}

pub async fn update_protein_external_id(
    pool: &MySqlPool,
    protein_id: i64,
    external_id: Option<&ExternalId>,
) -> Result<(), StorageError> {
    let ext = external_id.map(ExternalId::to_hex);
    query(UPDATE_PROTEIN_EXTERNAL_ID)
        .bind(&ext)
        .bind(protein_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_PROTEIN_EXTERNAL_ID, (&ext, protein_id), e))?;
    Ok(())
}

pub async fn update_protein_name(
    pool: &MySqlPool,
    protein_id: i64,
    name: &str,
) -> Result<(), StorageError> {
    query(UPDATE_PROTEIN_NAME)
        .bind(name)
        .bind(protein_id)
        .execute(pool)
        .await
        .map_err(|e| query_failed(UPDATE_PROTEIN_NAME, (name, protein_id), e))?;
    Ok(())
}

pub async fn count_proteins_for_external_id(
    pool: &MySqlPool,
    external_id: &ExternalId,
) -> Result<i64, StorageError> {
    let ext = external_id.to_hex();
    query_scalar(COUNT_PROTEINS_FOR_EXTERNAL_ID)
        .bind(&ext)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(COUNT_PROTEINS_FOR_EXTERNAL_ID, (&ext,), e))
}

pub async fn count_proteins_for_proposal_and_acronym(
    pool: &MySqlPool,
    proposal: &ExternalId,
    acronym: &str,
) -> Result<i64, StorageError> {
    let ext = proposal.to_hex();
    query_scalar(COUNT_PROTEINS_FOR_PROPOSAL_AND_ACRONYM)
        .bind(&ext)
        .bind(acronym)
        .fetch_one(pool)
        .await
        .map_err(|e| query_failed(COUNT_PROTEINS_FOR_PROPOSAL_AND_ACRONYM, (&ext, acronym), e))
}

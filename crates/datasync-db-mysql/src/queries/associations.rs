//! Mutations for the proposal and session participant tables.

use datasync_storage::{ProposalPersonLink, SessionPersonLink, StorageError};
use sqlx_core::query::query;
use sqlx_mysql::MySqlPool;

use crate::error::query_failed;

const INSERT_PROPOSAL_HAS_PERSON: &str =
    "INSERT IGNORE INTO ProposalHasPerson (proposalId, personId, role) VALUES (?, ?, ?)";

const UPDATE_PROPOSAL_HAS_PERSON: &str =
    "UPDATE ProposalHasPerson SET role = ? WHERE proposalId = ? AND personId = ?";

const INSERT_SESSION_HAS_PERSON: &str = r#"
INSERT IGNORE INTO Session_has_Person (sessionId, personId, role, remote)
VALUES (?, ?, ?, ?)"#;

const UPDATE_SESSION_HAS_PERSON: &str =
    "UPDATE Session_has_Person SET role = ?, remote = ? WHERE sessionId = ? AND personId = ?";

pub async fn insert_proposal_has_person(
    pool: &MySqlPool,
    link: &ProposalPersonLink,
) -> Result<(), StorageError> {
    let role = link.role.as_db_value();
    query(INSERT_PROPOSAL_HAS_PERSON)
        .bind(link.proposal_id)
        .bind(link.person_id)
        .bind(role)
        .execute(pool)
        .await
        .map_err(|e| {
            query_failed(
                INSERT_PROPOSAL_HAS_PERSON,
                (link.proposal_id, link.person_id, role),
                e,
            )
        })?;
    Ok(())
}

pub async fn update_proposal_has_person(
    pool: &MySqlPool,
    link: &ProposalPersonLink,
) -> Result<(), StorageError> {
    let role = link.role.as_db_value();
    query(UPDATE_PROPOSAL_HAS_PERSON)
        .bind(role)
        .bind(link.proposal_id)
        .bind(link.person_id)
        .execute(pool)
        .await
        .map_err(|e| {
            query_failed(
                UPDATE_PROPOSAL_HAS_PERSON,
                (role, link.proposal_id, link.person_id),
                e,
            )
        })?;
    Ok(())
}

pub async fn insert_session_has_person(
    pool: &MySqlPool,
    link: &SessionPersonLink,
) -> Result<(), StorageError> {
    let role = link.role.as_db_value();
    let remote = link.remote.to_db();
    query(INSERT_SESSION_HAS_PERSON)
        .bind(link.session_id)
        .bind(link.person_id)
        .bind(role)
        .bind(remote)
        .execute(pool)
        .await
        .map_err(|e| {
            query_failed(
                INSERT_SESSION_HAS_PERSON,
                (link.session_id, link.person_id, role, remote),
                e,
            )
        })?;
    Ok(())
}

pub async fn update_session_has_person(
    pool: &MySqlPool,
    link: &SessionPersonLink,
) -> Result<(), StorageError> {
    let role = link.role.as_db_value();
    let remote = link.remote.to_db();
    query(UPDATE_SESSION_HAS_PERSON)
        .bind(role)
        .bind(remote)
        .bind(link.session_id)
        .bind(link.person_id)
        .execute(pool)
        .await
        .map_err(|e| {
            query_failed(
                UPDATE_SESSION_HAS_PERSON,
                (role, remote, link.session_id, link.person_id),
                e,
            )
        })?;
    Ok(())
}

//! SQL query modules for the MySQL target catalog.
//!
//! Statements follow the downstream schema's table and column names. External
//! ids travel as hex strings (`hex()` out, `unhex(?)` in) and primary keys are
//! selected as signed integers.

pub mod associations;
pub mod entities;
pub mod extract;

use datasync_storage::StorageError;
use sqlx_mysql::MySqlQueryResult;

/// Returns the auto-increment id of an insert, or `None` when `INSERT IGNORE`
/// skipped the row.
pub(crate) fn inserted_id(result: &MySqlQueryResult) -> Result<Option<i64>, StorageError> {
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    i64::try_from(result.last_insert_id())
        .map(Some)
        .map_err(|_| StorageError::internal("insert id out of range"))
}

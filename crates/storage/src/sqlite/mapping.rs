use indexmap::IndexMap;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::records::{SetRecord, StatsRecord, TermRow, UserRecord};
use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn position_to_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("position overflow".into()))
}

/// Columns: `username`, `credential`.
pub(crate) fn map_user_row(row: &SqliteRow) -> Result<(String, UserRecord), StorageError> {
    let username: String = row.try_get("username").map_err(ser)?;
    let record = UserRecord {
        password: Some(row.try_get("credential").map_err(ser)?),
        flashcard_sets: IndexMap::new(),
    };
    Ok((username, record))
}

/// Columns: `username`, `name`, `category`, `stats_*`.
pub(crate) fn map_set_row(row: &SqliteRow) -> Result<(String, String, SetRecord), StorageError> {
    let username: String = row.try_get("username").map_err(ser)?;
    let name: String = row.try_get("name").map_err(ser)?;
    let stats = StatsRecord {
        correct: u32_from_i64("stats_correct", row.try_get("stats_correct").map_err(ser)?)?,
        total: u32_from_i64("stats_total", row.try_get("stats_total").map_err(ser)?)?,
        percentage: row.try_get("stats_percentage").map_err(ser)?,
    };
    let record = SetRecord {
        category: Some(row.try_get("category").map_err(ser)?),
        terms: Some(IndexMap::new()),
        stats: Some(stats),
    };
    Ok((username, name, record))
}

/// Columns: `username`, `set_name`, `term`, `definition`, `correct`, `total`.
pub(crate) fn map_term_row(
    row: &SqliteRow,
) -> Result<(String, String, String, TermRow), StorageError> {
    let username: String = row.try_get("username").map_err(ser)?;
    let set_name: String = row.try_get("set_name").map_err(ser)?;
    let term: String = row.try_get("term").map_err(ser)?;
    let record = TermRow {
        definition: Some(row.try_get("definition").map_err(ser)?),
        correct: Some(u32_from_i64("correct", row.try_get("correct").map_err(ser)?)?),
        total: Some(u32_from_i64("total", row.try_get("total").map_err(ser)?)?),
    };
    Ok((username, set_name, term, record))
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History queries against a Galaxy SQLite database.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rusqlite::params;
use stalehist_core::{Owner, OwnerId, Record, RecordId, StalehistError};
use tracing::debug;

use crate::database::Database;

pub(crate) const STALE_HISTORIES: &str = "SELECT h.id, h.name, h.update_time, u.id, u.username, u.email
     FROM history h
     JOIN galaxy_user u ON h.user_id = u.id
     WHERE h.deleted = 0
       AND h.published = 0
       AND NOT EXISTS (
           SELECT 1 FROM history_user_share_association s WHERE s.history_id = h.id
       )
       AND h.update_time < strftime('%Y-%m-%d %H:%M:%f', 'now', ?1)
     ORDER BY h.id ASC";

/// The delete batch did not match exactly the requested live histories.
#[derive(Debug, thiserror::Error)]
#[error("expected to mark {expected} histories deleted, {matched} were live")]
pub struct BatchMismatch {
    pub expected: usize,
    pub matched: usize,
}

/// Every live, unpublished, unshared history not updated for `age_weeks`.
pub async fn stale_histories(db: &Database, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
    let modifier = format!("-{} days", u64::from(age_weeks) * 7);
    debug!(age_weeks, sql = STALE_HISTORIES, "querying stale histories");
    db.connection()
        .call(move |conn| -> Result<Vec<Record>, rusqlite::Error> {
            let mut stmt = conn.prepare(STALE_HISTORIES)?;
            let rows = stmt.query_map(params![modifier], |row| {
                let updated: NaiveDateTime = row.get(2)?;
                Ok(Record {
                    id: RecordId(row.get(0)?),
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    updated_at: updated.and_utc(),
                    owner: Owner {
                        id: OwnerId(row.get(3)?),
                        username: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        email: row.get(5)?,
                    },
                })
            })?;
            let records = rows.collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(|e| StalehistError::query("stale_histories", e.to_string()))
}

/// Set `deleted = 1` on exactly `ids`, all or nothing.
///
/// Only live histories count as matched; an id that is missing or already
/// deleted makes the whole batch roll back.
pub async fn mark_deleted(db: &Database, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Result<u64, BatchMismatch>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut matched = 0usize;
            {
                let mut stmt =
                    tx.prepare("UPDATE history SET deleted = 1 WHERE id = ?1 AND deleted = 0")?;
                for id in &ids {
                    matched += stmt.execute(params![id])?;
                }
            }
            if matched != ids.len() {
                tx.rollback()?;
                return Ok(Err(BatchMismatch {
                    expected: ids.len(),
                    matched,
                }));
            }
            tx.commit()?;
            Ok(Ok(matched as u64))
        })
        .await
        .map_err(|e| StalehistError::Commit {
            source: e.to_string().into(),
        })?;

    outcome.map_err(|mismatch| StalehistError::Commit {
        source: Box::new(mismatch),
    })
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the record store gateway.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use stalehist_core::{
    bounded, Record, RecordId, RecordStore, StalehistError, StoreConnector,
};

use crate::database::Database;
use crate::queries;

/// Opens [`SqliteRecordStore`]s on an existing Galaxy SQLite file.
pub struct SqliteConnector {
    path: String,
    timeout: Duration,
}

impl SqliteConnector {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl StoreConnector for SqliteConnector {
    async fn connect(&self) -> Result<Box<dyn RecordStore>, StalehistError> {
        let db = bounded(self.timeout, Database::open(&self.path)).await?;
        Ok(Box::new(SqliteRecordStore {
            db: Mutex::new(Some(db)),
            timeout: self.timeout,
        }))
    }
}

/// A single SQLite connection serving one cleanup run.
pub struct SqliteRecordStore {
    db: Mutex<Option<Database>>,
    timeout: Duration,
}

fn closed() -> StalehistError {
    StalehistError::Internal("sqlite store already closed".to_string())
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn backend(&self) -> &str {
        "sqlite"
    }

    async fn query_stale_records(&self, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
        let guard = self.db.lock().await;
        let db = guard.as_ref().ok_or_else(closed)?;
        bounded(self.timeout, queries::histories::stale_histories(db, age_weeks)).await
    }

    async fn mark_deleted(&self, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError> {
        let guard = self.db.lock().await;
        let db = guard.as_ref().ok_or_else(closed)?;
        bounded(self.timeout, queries::histories::mark_deleted(db, ids)).await
    }

    async fn close(&self) -> Result<(), StalehistError> {
        if let Some(db) = self.db.lock().await.take() {
            db.close().await?;
            debug!("sqlite store closed");
        }
        Ok(())
    }
}

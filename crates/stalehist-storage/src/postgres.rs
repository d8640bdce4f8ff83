// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PostgreSQL implementation of the record store gateway.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::debug;

use stalehist_core::{
    bounded, Owner, OwnerId, Record, RecordId, RecordStore, StalehistError, StoreConnector,
};

use crate::queries::histories::BatchMismatch;

const STALE_HISTORIES: &str = r#"
    SELECT h.id, h.name, h.update_time, u.id AS user_id, u.username, u.email
    FROM history h
    JOIN galaxy_user u ON h.user_id = u.id
    WHERE h.deleted = FALSE
      AND h.published = FALSE
      AND NOT EXISTS (
          SELECT 1 FROM history_user_share_association s WHERE s.history_id = h.id
      )
      AND h.update_time < (now() - make_interval(weeks => $1))
    ORDER BY h.id ASC
"#;

const MARK_DELETED: &str = r#"
    UPDATE history SET deleted = TRUE
    WHERE id = ANY($1::bigint[]) AND deleted = FALSE
"#;

/// Connection parameters for a Galaxy PostgreSQL database.
pub struct PostgresConnector {
    host: String,
    port: u16,
    dbname: String,
    user: String,
    password: Option<SecretString>,
    timeout: Duration,
}

impl PostgresConnector {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        dbname: impl Into<String>,
        user: impl Into<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            dbname: dbname.into(),
            user: user.into(),
            password: password.map(SecretString::from),
            timeout,
        }
    }

    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.user);
        match &self.password {
            Some(password) => options.password(password.expose_secret()),
            None => options,
        }
    }
}

#[async_trait]
impl StoreConnector for PostgresConnector {
    async fn connect(&self) -> Result<Box<dyn RecordStore>, StalehistError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.timeout)
            .connect_with(self.connect_options())
            .await
            .map_err(|e| StalehistError::Connection {
                source: Box::new(e),
            })?;
        debug!(host = %self.host, port = self.port, dbname = %self.dbname, "postgres store connected");
        Ok(Box::new(PostgresRecordStore {
            pool,
            timeout: self.timeout,
        }))
    }
}

/// A one-connection pool serving one cleanup run.
pub struct PostgresRecordStore {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresRecordStore {
    fn parse_record(row: &PgRow) -> Result<Record, sqlx::Error> {
        let id: i32 = row.try_get("id")?;
        let updated: NaiveDateTime = row.try_get("update_time")?;
        let user_id: i32 = row.try_get("user_id")?;
        Ok(Record {
            id: RecordId(i64::from(id)),
            name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
            updated_at: updated.and_utc(),
            owner: Owner {
                id: OwnerId(i64::from(user_id)),
                username: row
                    .try_get::<Option<String>, _>("username")?
                    .unwrap_or_default(),
                email: row.try_get("email")?,
            },
        })
    }

    async fn fetch_stale(&self, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
        let weeks = i32::try_from(age_weeks)
            .map_err(|_| StalehistError::Internal(format!("age {age_weeks} weeks out of range")))?;
        debug!(age_weeks, sql = STALE_HISTORIES, "querying stale histories");
        let rows = sqlx::query(STALE_HISTORIES)
            .bind(weeks)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StalehistError::query("stale_histories", e))?;
        rows.iter()
            .map(Self::parse_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StalehistError::query("stale_histories", e))
    }

    async fn update_deleted(&self, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError> {
        let commit_err = |e: sqlx::Error| StalehistError::Commit {
            source: Box::new(e),
        };
        let ids: Vec<i64> = ids.iter().map(|id| id.0).collect();

        let mut tx = self.pool.begin().await.map_err(commit_err)?;
        let result = sqlx::query(MARK_DELETED)
            .bind(ids.as_slice())
            .execute(&mut *tx)
            .await;
        let matched = match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(error = %rollback, "rollback after failed update also failed");
                }
                return Err(commit_err(e));
            }
        };

        if matched != ids.len() as u64 {
            tx.rollback().await.map_err(commit_err)?;
            return Err(StalehistError::Commit {
                source: Box::new(BatchMismatch {
                    expected: ids.len(),
                    matched: matched as usize,
                }),
            });
        }
        tx.commit().await.map_err(commit_err)?;
        Ok(matched)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    fn backend(&self) -> &str {
        "postgres"
    }

    async fn query_stale_records(&self, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
        bounded(self.timeout, self.fetch_stale(age_weeks)).await
    }

    async fn mark_deleted(&self, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError> {
        if ids.is_empty() {
            return Ok(0);
        }
        bounded(self.timeout, self.update_deleted(ids)).await
    }

    async fn close(&self) -> Result<(), StalehistError> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            debug!("postgres store closed");
        }
        Ok(())
    }
}

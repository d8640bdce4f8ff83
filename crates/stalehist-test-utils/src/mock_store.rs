// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store for deterministic tests.
//!
//! `MockStore` is both the [`StoreConnector`] and a handle for arranging
//! rows, moving the clock and inspecting calls. Every connection it hands
//! out shares the same table.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use stalehist_core::{Owner, Record, RecordId, RecordStore, StalehistError, StoreConnector};

/// Counters for every gateway call made against a [`MockStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub connects: usize,
    /// The age, in weeks, of every `query_stale_records` call in order.
    pub queries: Vec<u32>,
    pub mark_deleted: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub closes: usize,
}

impl StoreCalls {
    /// Total calls of any kind.
    pub fn total(&self) -> usize {
        self.connects + self.queries.len() + self.mark_deleted + self.closes
    }
}

#[derive(Debug, Clone)]
struct Row {
    record: Record,
    deleted: bool,
    published: bool,
    shared: bool,
}

#[derive(Debug)]
struct State {
    now: DateTime<Utc>,
    rows: Vec<Row>,
    fail_connect: bool,
    fail_queries_at: Option<u32>,
    fail_mark_deleted: bool,
    mark_deleted_times_out: bool,
    calls: StoreCalls,
}

/// Mock record store with a controllable clock.
#[derive(Clone)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// An empty store whose clock starts at 2024-06-03 12:00 UTC.
    pub fn new() -> Self {
        let now = Utc
            .with_ymd_and_hms(2024, 6, 3, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            state: Arc::new(Mutex::new(State {
                now,
                rows: Vec::new(),
                fail_connect: false,
                fail_queries_at: None,
                fail_mark_deleted: false,
                mark_deleted_times_out: false,
                calls: StoreCalls::default(),
            })),
        }
    }

    /// The store's current time.
    pub async fn now(&self) -> DateTime<Utc> {
        self.state.lock().await.now
    }

    /// Moves the clock forward.
    pub async fn advance(&self, by: Duration) {
        self.state.lock().await.now += by;
    }

    /// Adds a live history last updated `age_days` before the current time.
    pub async fn add_history(&self, id: i64, owner: &Owner, name: &str, age_days: f64) {
        let mut state = self.state.lock().await;
        let updated_at = state.now - days(age_days);
        state.rows.push(Row {
            record: Record {
                id: RecordId(id),
                name: name.to_string(),
                owner: owner.clone(),
                updated_at,
            },
            deleted: false,
            published: false,
            shared: false,
        });
    }

    /// Moves the last update of history `id` to `age_days` before now.
    pub async fn touch(&self, id: i64, age_days: f64) {
        let mut state = self.state.lock().await;
        let updated_at = state.now - days(age_days);
        if let Some(row) = find(&mut state.rows, id) {
            row.record.updated_at = updated_at;
        }
    }

    pub async fn publish(&self, id: i64) {
        if let Some(row) = find(&mut self.state.lock().await.rows, id) {
            row.published = true;
        }
    }

    pub async fn share(&self, id: i64) {
        if let Some(row) = find(&mut self.state.lock().await.rows, id) {
            row.shared = true;
        }
    }

    /// Marks history `id` deleted outside of any gateway call.
    pub async fn delete(&self, id: i64) {
        if let Some(row) = find(&mut self.state.lock().await.rows, id) {
            row.deleted = true;
        }
    }

    pub async fn is_deleted(&self, id: i64) -> bool {
        self.state
            .lock()
            .await
            .rows
            .iter()
            .any(|row| row.record.id.0 == id && row.deleted)
    }

    /// Makes every `connect` fail with [`StalehistError::Connection`].
    pub async fn fail_connect(&self) {
        self.state.lock().await.fail_connect = true;
    }

    /// Makes `query_stale_records(age_weeks)` fail with [`StalehistError::Query`].
    pub async fn fail_query_at(&self, age_weeks: u32) {
        self.state.lock().await.fail_queries_at = Some(age_weeks);
    }

    /// Makes `mark_deleted` fail mid-batch; the staged changes are rolled back.
    pub async fn fail_mark_deleted(&self) {
        self.state.lock().await.fail_mark_deleted = true;
    }

    /// Makes `mark_deleted` report [`StalehistError::Timeout`] without touching any row.
    pub async fn time_out_mark_deleted(&self) {
        self.state.lock().await.mark_deleted_times_out = true;
    }

    /// A snapshot of the calls made so far.
    pub async fn calls(&self) -> StoreCalls {
        self.state.lock().await.calls.clone()
    }

    /// A connection to this store without going through `connect`.
    pub fn open(&self) -> MockRecordStore {
        MockRecordStore {
            state: Arc::clone(&self.state),
            closed: Mutex::new(false),
        }
    }
}

fn days(age_days: f64) -> Duration {
    Duration::seconds((age_days * 86_400.0).round() as i64)
}

fn find(rows: &mut [Row], id: i64) -> Option<&mut Row> {
    rows.iter_mut().find(|row| row.record.id.0 == id)
}

#[async_trait]
impl StoreConnector for MockStore {
    async fn connect(&self) -> Result<Box<dyn RecordStore>, StalehistError> {
        let mut state = self.state.lock().await;
        state.calls.connects += 1;
        if state.fail_connect {
            return Err(StalehistError::Connection {
                source: "connection refused".into(),
            });
        }
        drop(state);
        Ok(Box::new(self.open()))
    }
}

/// One connection to a [`MockStore`].
pub struct MockRecordStore {
    state: Arc<Mutex<State>>,
    closed: Mutex<bool>,
}

impl MockRecordStore {
    async fn ensure_open(&self) -> Result<(), StalehistError> {
        if *self.closed.lock().await {
            return Err(StalehistError::Internal("mock store already closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    fn backend(&self) -> &str {
        "mock"
    }

    async fn query_stale_records(&self, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
        self.ensure_open().await?;
        let mut state = self.state.lock().await;
        state.calls.queries.push(age_weeks);
        if state.fail_queries_at == Some(age_weeks) {
            return Err(StalehistError::query(
                "stale_histories",
                "canceling statement due to statement timeout",
            ));
        }
        let cutoff = state.now - Duration::weeks(i64::from(age_weeks));
        let mut stale: Vec<Record> = state
            .rows
            .iter()
            .filter(|row| !row.deleted && !row.published && !row.shared)
            .filter(|row| row.record.updated_at < cutoff)
            .map(|row| row.record.clone())
            .collect();
        stale.sort_by_key(|record| record.id);
        Ok(stale)
    }

    async fn mark_deleted(&self, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError> {
        self.ensure_open().await?;
        if ids.is_empty() {
            return Ok(0);
        }
        let mut state = self.state.lock().await;
        state.calls.mark_deleted += 1;
        if state.mark_deleted_times_out {
            return Err(StalehistError::Timeout {
                duration: std::time::Duration::from_secs(30),
            });
        }

        let mut staged = state.rows.clone();
        let mut matched = 0usize;
        for row in staged.iter_mut() {
            if ids.contains(&row.record.id) && !row.deleted {
                row.deleted = true;
                matched += 1;
            }
        }

        if state.fail_mark_deleted || matched != ids.len() {
            state.calls.rollbacks += 1;
            let reason = if state.fail_mark_deleted {
                "server closed the connection unexpectedly".to_string()
            } else {
                format!("expected to mark {} histories deleted, {matched} were live", ids.len())
            };
            return Err(StalehistError::Commit {
                source: reason.into(),
            });
        }

        state.rows = staged;
        state.calls.commits += 1;
        Ok(matched as u64)
    }

    async fn close(&self) -> Result<(), StalehistError> {
        let mut closed = self.closed.lock().await;
        if !*closed {
            *closed = true;
            self.state.lock().await.calls.closes += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::owner;

    #[tokio::test]
    async fn query_filters_and_orders_rows() {
        let store = MockStore::new();
        let alice = owner(1, "alice");
        store.add_history(3, &alice, "c", 100.0).await;
        store.add_history(1, &alice, "a", 100.0).await;
        store.add_history(2, &alice, "published", 100.0).await;
        store.add_history(4, &alice, "shared", 100.0).await;
        store.add_history(5, &alice, "fresh", 1.0).await;
        store.publish(2).await;
        store.share(4).await;

        let conn = store.open();
        let ids: Vec<i64> = conn
            .query_stale_records(2)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.calls().await.queries, vec![2]);
    }

    #[tokio::test]
    async fn failed_mark_deleted_leaves_rows_untouched() {
        let store = MockStore::new();
        let alice = owner(1, "alice");
        store.add_history(1, &alice, "a", 100.0).await;
        store.add_history(2, &alice, "b", 100.0).await;
        store.fail_mark_deleted().await;

        let conn = store.open();
        let ids = BTreeSet::from([RecordId(1), RecordId(2)]);
        let err = conn.mark_deleted(&ids).await.unwrap_err();
        assert!(matches!(err, StalehistError::Commit { .. }));
        assert!(!store.is_deleted(1).await);
        assert!(!store.is_deleted(2).await);
        assert_eq!(store.calls().await.rollbacks, 1);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_calls() {
        let store = MockStore::new();
        let conn = store.connect().await.unwrap();
        conn.close().await.unwrap();
        conn.close().await.unwrap();
        assert_eq!(store.calls().await.closes, 1);
        assert!(conn.query_stale_records(1).await.is_err());
    }

    #[tokio::test]
    async fn advancing_the_clock_ages_rows() {
        let store = MockStore::new();
        store.add_history(1, &owner(1, "alice"), "a", 6.0).await;
        let conn = store.open();
        assert!(conn.query_stale_records(1).await.unwrap().is_empty());

        store.advance(Duration::days(2)).await;
        assert_eq!(conn.query_stale_records(1).await.unwrap().len(), 1);
    }
}

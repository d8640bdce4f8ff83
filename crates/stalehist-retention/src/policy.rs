// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warn set and delete set computation.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use stalehist_core::{AgeWindow, Record, RecordId, RecordStore, StalehistError};
use tracing::debug;

/// The outcome of one policy evaluation. Recomputed on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Histories that crossed the warn threshold within the last week.
    pub warn: Vec<Record>,
    /// Histories at or past the delete threshold.
    pub delete: Vec<Record>,
}

impl Evaluation {
    /// Ids of the delete set, ready for `RecordStore::mark_deleted`.
    pub fn delete_ids(&self) -> BTreeSet<RecordId> {
        self.delete.iter().map(|r| r.id).collect()
    }
}

/// Computes both sets with three stale-history queries.
pub async fn evaluate(
    store: &dyn RecordStore,
    window: AgeWindow,
) -> Result<Evaluation, StalehistError> {
    let warn = warn_set(store, window).await?;
    let delete = delete_set(store, window).await?;
    debug!(
        warn = warn.len(),
        delete = delete.len(),
        backend = store.backend(),
        "retention policy evaluated"
    );
    Ok(Evaluation { warn, delete })
}

/// Histories stale at `warn_weeks` but not yet at `warn_weeks + 1`.
pub async fn warn_set(
    store: &dyn RecordStore,
    window: AgeWindow,
) -> Result<Vec<Record>, StalehistError> {
    // warn_weeks < delete_weeks, so the increment cannot overflow.
    let (warn, past_warn) = (window.warn_weeks(), window.warn_weeks() + 1);

    let stale_at_warn = stale(store, warn).await?;
    let stale_past_warn = stale(store, past_warn).await?;
    Ok(subtract(stale_at_warn, &stale_past_warn))
}

/// Histories stale at `delete_weeks`.
pub async fn delete_set(
    store: &dyn RecordStore,
    window: AgeWindow,
) -> Result<Vec<Record>, StalehistError> {
    stale(store, window.delete_weeks()).await
}

/// `base` without any record whose id appears in `later`, keeping the order
/// of `base`.
pub fn subtract(base: Vec<Record>, later: &[Record]) -> Vec<Record> {
    let seen: HashSet<RecordId> = later.iter().map(|r| r.id).collect();
    base.into_iter().filter(|r| !seen.contains(&r.id)).collect()
}

async fn stale(store: &dyn RecordStore, age_weeks: u32) -> Result<Vec<Record>, StalehistError> {
    let records = store.query_stale_records(age_weeks).await?;
    debug!(age_weeks, count = records.len(), "stale histories fetched");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stalehist_core::{Owner, OwnerId};
    use stalehist_test_utils::fixtures::owner;
    use stalehist_test_utils::MockStore;

    const WEEK: f64 = 7.0;

    fn record(id: i64) -> Record {
        Record {
            id: RecordId(id),
            name: format!("h{id}"),
            owner: Owner {
                id: OwnerId(1),
                username: "alice".into(),
                email: "alice@example.org".into(),
            },
            updated_at: Utc::now(),
        }
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn subtract_keeps_base_order() {
        let base = vec![record(5), record(1), record(3)];
        let later = vec![record(1)];
        assert_eq!(ids(&subtract(base, &later)), vec![5, 3]);
    }

    #[test]
    fn subtract_ignores_ids_only_in_later() {
        let base = vec![record(1)];
        let later = vec![record(2)];
        assert_eq!(ids(&subtract(base, &later)), vec![1]);
    }

    #[tokio::test]
    async fn scenario_picks_one_warning_and_one_deletion() {
        let store = MockStore::new();
        let alice = owner(1, "alice");
        store.add_history(1, &alice, "R1", 11.2 * WEEK).await;
        store.add_history(2, &alice, "R2", 12.1 * WEEK).await;
        store.add_history(3, &alice, "R3", 13.5 * WEEK).await;

        let window = AgeWindow::new(11, 13).unwrap();
        let eval = evaluate(&store.open(), window).await.unwrap();
        assert_eq!(ids(&eval.warn), vec![1]);
        assert_eq!(ids(&eval.delete), vec![3]);
        assert_eq!(eval.delete_ids(), BTreeSet::from([RecordId(3)]));
    }

    #[tokio::test]
    async fn evaluate_queries_warn_warn_plus_one_then_delete() {
        let store = MockStore::new();
        let window = AgeWindow::new(4, 9).unwrap();
        evaluate(&store.open(), window).await.unwrap();
        assert_eq!(store.calls().await.queries, vec![4, 5, 9]);
    }

    #[tokio::test]
    async fn adjacent_thresholds_warn_and_delete_in_the_same_week() {
        let store = MockStore::new();
        store.add_history(1, &owner(1, "alice"), "a", 2.5 * WEEK).await;

        let window = AgeWindow::new(2, 3).unwrap();
        let eval = evaluate(&store.open(), window).await.unwrap();
        assert_eq!(ids(&eval.warn), vec![1]);
        assert!(eval.delete.is_empty());
    }

    #[tokio::test]
    async fn query_failure_propagates() {
        let store = MockStore::new();
        store.fail_query_at(12).await;
        let window = AgeWindow::new(11, 13).unwrap();
        let err = evaluate(&store.open(), window).await.unwrap_err();
        assert!(matches!(err, StalehistError::Query { .. }), "got {err:?}");
    }
}

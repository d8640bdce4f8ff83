// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy behaviour across consecutive weekly runs.

use std::collections::BTreeSet;

use chrono::Duration;
use proptest::prelude::*;

use stalehist_core::{AgeWindow, RecordId, RecordStore};
use stalehist_retention::{delete_set, evaluate, warn_set};
use stalehist_test_utils::fixtures::owner;
use stalehist_test_utils::MockStore;

const WEEK: f64 = 7.0;
const SECS_PER_DAY: f64 = 86_400.0;

fn ids(records: &[stalehist_core::Record]) -> BTreeSet<i64> {
    records.iter().map(|r| r.id.0).collect()
}

#[tokio::test]
async fn history_is_warned_on_one_run_only() {
    let store = MockStore::new();
    store.add_history(1, &owner(1, "alice"), "R", 11.9 * WEEK).await;
    let window = AgeWindow::new(11, 13).unwrap();

    let first = warn_set(&store.open(), window).await.unwrap();
    assert_eq!(ids(&first), BTreeSet::from([1]));

    store.advance(Duration::weeks(1)).await;
    let second = warn_set(&store.open(), window).await.unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn deleted_histories_leave_the_delete_set() {
    let store = MockStore::new();
    let alice = owner(1, "alice");
    store.add_history(1, &alice, "a", 14.0 * WEEK).await;
    store.add_history(2, &alice, "b", 20.0 * WEEK).await;
    let window = AgeWindow::new(11, 13).unwrap();
    let conn = store.open();

    let eval = evaluate(&conn, window).await.unwrap();
    assert_eq!(conn.mark_deleted(&eval.delete_ids()).await.unwrap(), 2);
    assert!(delete_set(&conn, window).await.unwrap().is_empty());
    assert!(store.is_deleted(1).await);
}

#[tokio::test]
async fn touched_history_restarts_its_clock() {
    let store = MockStore::new();
    store.add_history(1, &owner(1, "alice"), "a", 12.5 * WEEK).await;
    store.touch(1, 0.0).await;
    let eval = evaluate(&store.open(), AgeWindow::new(11, 13).unwrap())
        .await
        .unwrap();
    assert!(eval.warn.is_empty());
    assert!(eval.delete.is_empty());
}

fn run<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(fut)
}

proptest! {
    #[test]
    fn consecutive_weekly_warn_sets_are_disjoint(
        ages in prop::collection::vec(0u32..(200 * 86_400), 1..40),
        warn in 1u32..20,
        grace in 1u32..10,
    ) {
        let window = AgeWindow::new(warn, warn + grace).unwrap();
        let (this_week, next_week) = run(async {
            let store = MockStore::new();
            let alice = owner(1, "alice");
            for (i, secs) in ages.iter().enumerate() {
                store.add_history(i as i64, &alice, "h", f64::from(*secs) / SECS_PER_DAY).await;
            }
            let this_week = warn_set(&store.open(), window).await.unwrap();
            store.advance(Duration::weeks(1)).await;
            let next_week = warn_set(&store.open(), window).await.unwrap();
            (ids(&this_week), ids(&next_week))
        });
        prop_assert!(this_week.is_disjoint(&next_week));
    }

    #[test]
    fn young_history_is_warned_exactly_once_before_deletion(
        age_secs in 0u32..(7 * 86_400),
        warn in 1u32..15,
        grace in 1u32..6,
    ) {
        let window = AgeWindow::new(warn, warn + grace).unwrap();
        let (warned_runs, deleted_runs) = run(async {
            let store = MockStore::new();
            store.add_history(1, &owner(1, "alice"), "h", f64::from(age_secs) / SECS_PER_DAY).await;
            let mut warned_runs = Vec::new();
            let mut deleted_runs = Vec::new();
            for week in 0..(warn + grace + 2) {
                let eval = evaluate(&store.open(), window).await.unwrap();
                if !eval.warn.is_empty() {
                    warned_runs.push(week);
                }
                if eval.delete_ids().contains(&RecordId(1)) {
                    deleted_runs.push(week);
                }
                store.advance(Duration::weeks(1)).await;
            }
            (warned_runs, deleted_runs)
        });
        prop_assert_eq!(warned_runs.len(), 1);
        prop_assert!(!deleted_runs.is_empty());
        prop_assert!(warned_runs[0] < deleted_runs[0]);
    }
}

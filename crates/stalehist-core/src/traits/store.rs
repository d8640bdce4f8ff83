// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store gateway traits.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StalehistError;
use crate::types::{Record, RecordId};

/// Opens the single store connection a cleanup run works with.
///
/// Nothing touches the store until [`StoreConnector::connect`] is called, so
/// a connector can be built from configuration without any I/O.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Opens a connection to the record store.
    async fn connect(&self) -> Result<Box<dyn RecordStore>, StalehistError>;
}

/// A live connection to the store holding user histories.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn backend(&self) -> &str;

    /// Returns every live history whose last update is older than
    /// `now - age_weeks`.
    ///
    /// Deleted, published, and shared histories are never returned.
    async fn query_stale_records(&self, age_weeks: u32) -> Result<Vec<Record>, StalehistError>;

    /// Marks exactly `ids` as deleted in one transaction.
    ///
    /// Either every id is updated or, on any failure, the transaction is
    /// rolled back and [`StalehistError::Commit`] is returned. Returns the
    /// number of histories marked.
    async fn mark_deleted(&self, ids: &BTreeSet<RecordId>) -> Result<u64, StalehistError>;

    /// Releases the connection. Calling it twice is harmless.
    async fn close(&self) -> Result<(), StalehistError>;
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cleanup run: mode dispatch and the execution sequence.
//!
//! A run holds at most one store connection, and releases it before the
//! first warning is sent. The delete transaction is the only write.

use std::collections::BTreeSet;
use std::io::Write;

use serde::Serialize;
use strum::Display;
use tracing::{error, info, warn};

use stalehist_config::StalehistConfig;
use stalehist_core::{AgeWindow, Record, RecordId, RecordStore, StalehistError, StoreConnector};
use stalehist_notify::{DispatchReport, Notifier};
use stalehist_retention::{delete_set, evaluate, group_by_owner, warn_set, Evaluation};

use crate::report::{self, Output};

/// What a run does. Resolved once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Print the resolved configuration. No store or mail I/O.
    ShowConfig,
    /// Report what would happen. Reads only.
    ReportOnly,
    /// Mark histories deleted and warn owners.
    Execute,
    /// Nothing selected.
    Noop,
}

impl RunMode {
    /// Precedence: show-config, then info-only, then execute.
    pub fn from_flags(show_config: bool, info_only: bool, execute: bool) -> Self {
        if show_config {
            Self::ShowConfig
        } else if info_only {
            Self::ReportOnly
        } else if execute {
            Self::Execute
        } else {
            Self::Noop
        }
    }
}

/// What a run did.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub warned_owners: usize,
    pub warned_records: usize,
    pub deleted: u64,
    /// The delete transaction failed and was rolled back.
    pub deletion_skipped: bool,
    pub dispatch: Option<DispatchReport>,
}

impl RunSummary {
    fn new(mode: RunMode) -> Self {
        Self {
            mode,
            warned_owners: 0,
            warned_records: 0,
            deleted: 0,
            deletion_skipped: false,
            dispatch: None,
        }
    }

    /// Process exit status for a completed run. Mail failures do not count.
    pub fn exit_code(&self) -> u8 {
        if self.deletion_skipped { 2 } else { 0 }
    }
}

/// Everything a cleanup run works with.
pub struct Cleanup<'a> {
    pub config: &'a StalehistConfig,
    pub window: AgeWindow,
    pub connector: &'a dyn StoreConnector,
    pub notifier: &'a Notifier,
    pub output: Output,
}

impl Cleanup<'_> {
    /// Runs `mode`, writing the operator-facing output to `out`.
    pub async fn run(
        &self,
        mode: RunMode,
        out: &mut dyn Write,
    ) -> Result<RunSummary, StalehistError> {
        info!(%mode, warn_weeks = self.window.warn_weeks(), delete_weeks = self.window.delete_weeks(), "cleanup run starting");
        match mode {
            RunMode::ShowConfig => {
                report::write_config(out, self.config, self.output)?;
                Ok(RunSummary::new(mode))
            }
            RunMode::ReportOnly => {
                let evaluation = self.report_only().await?;
                report::write_report(out, &evaluation, self.window, self.output)?;
                let mut summary = RunSummary::new(mode);
                summary.warned_owners = group_by_owner(&evaluation.warn).len();
                summary.warned_records = evaluation.warn.len();
                Ok(summary)
            }
            RunMode::Execute => {
                let summary = self.execute().await?;
                report::write_summary(out, &summary, self.output)?;
                Ok(summary)
            }
            RunMode::Noop => {
                info!("no run mode selected; pass --info-only or --actually-delete-things");
                Ok(RunSummary::new(mode))
            }
        }
    }

    async fn report_only(&self) -> Result<Evaluation, StalehistError> {
        let store = self.connect().await?;
        let evaluation = evaluate(store.as_ref(), self.window).await;
        close(store.as_ref()).await;
        evaluation
    }

    async fn execute(&self) -> Result<RunSummary, StalehistError> {
        let store = self.connect().await?;
        let staged = self.delete_then_warn(store.as_ref()).await;
        close(store.as_ref()).await;
        let (deleted, deletion_skipped, warn) = staged?;

        let batches = group_by_owner(&warn);
        let dispatch = self.notifier.notify_all(&batches, self.window).await;

        Ok(RunSummary {
            mode: RunMode::Execute,
            warned_owners: batches.len(),
            warned_records: warn.len(),
            deleted,
            deletion_skipped,
            dispatch: Some(dispatch),
        })
    }

    /// Marks the delete set deleted, then computes a fresh warn set.
    async fn delete_then_warn(
        &self,
        store: &dyn RecordStore,
    ) -> Result<(u64, bool, Vec<Record>), StalehistError> {
        let doomed = delete_set(store, self.window).await?;
        let mut deleted = 0;
        let mut skipped = false;

        if !doomed.is_empty() {
            let ids: BTreeSet<RecordId> = doomed.iter().map(|r| r.id).collect();
            match store.mark_deleted(&ids).await {
                Ok(count) => {
                    deleted = count;
                    info!(count, delete_weeks = self.window.delete_weeks(), "histories marked deleted");
                }
                Err(e) if e.skips_deletion() => {
                    error!(error = %e, count = ids.len(), "marking histories deleted failed, deletion skipped this run");
                    skipped = true;
                }
                Err(e) => return Err(e),
            }
        }

        let warn = warn_set(store, self.window).await?;
        Ok((deleted, skipped, warn))
    }

    async fn connect(&self) -> Result<Box<dyn RecordStore>, StalehistError> {
        let store = self.connector.connect().await?;
        info!(backend = store.backend(), "connected to record store");
        Ok(store)
    }
}

async fn close(store: &dyn RecordStore) {
    if let Err(e) = store.close().await {
        warn!(error = %e, "closing the record store failed");
    }
}

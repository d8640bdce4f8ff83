// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-owner dispatch with failure isolation.

use serde::{Serialize, Serializer};
use stalehist_core::{bounded, AgeWindow, MailTransport, Owner, OwnerId, Record, StalehistError};
use stalehist_retention::OwnerBatch;
use tracing::{debug, info, warn};

use crate::message::{render, NotifySettings};

/// A delivery that failed for one owner.
#[derive(Debug, Serialize)]
pub struct DispatchFailure {
    pub owner: OwnerId,
    #[serde(serialize_with = "display")]
    pub error: StalehistError,
}

fn display<S: Serializer>(error: &StalehistError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Outcome of one notification pass.
#[derive(Debug, Default, Serialize)]
pub struct DispatchReport {
    pub sent: Vec<OwnerId>,
    pub failed: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sends warnings through a [`MailTransport`].
pub struct Notifier {
    transport: Box<dyn MailTransport>,
    settings: NotifySettings,
}

impl Notifier {
    pub fn new(transport: Box<dyn MailTransport>, settings: NotifySettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Renders and sends one warning. Sends nothing when `records` is empty.
    pub async fn notify(
        &self,
        owner: &Owner,
        records: &[Record],
        window: AgeWindow,
    ) -> Result<(), StalehistError> {
        if records.is_empty() {
            return Ok(());
        }
        let mail = render(owner, records, window, &self.settings);
        bounded(self.settings.timeout, self.transport.send(&mail)).await?;
        debug!(
            owner = %owner.id,
            histories = records.len(),
            transport = self.transport.name(),
            "warning sent"
        );
        Ok(())
    }

    /// Warns every owner in turn.
    ///
    /// A failure is logged and recorded against its owner, then the next
    /// owner is tried.
    pub async fn notify_all(&self, batches: &[OwnerBatch], window: AgeWindow) -> DispatchReport {
        let mut report = DispatchReport::default();
        for batch in batches {
            if batch.records.is_empty() {
                continue;
            }
            match self.notify(&batch.owner, &batch.records, window).await {
                Ok(()) => report.sent.push(batch.owner.id),
                Err(error) => {
                    warn!(
                        owner = %batch.owner.id,
                        email = %batch.owner.email,
                        error = %error,
                        "failed to send deletion warning"
                    );
                    report.failed.push(DispatchFailure {
                        owner: batch.owner.id,
                        error,
                    });
                }
            }
        }
        info!(
            sent = report.sent.len(),
            failed = report.failed.len(),
            "deletion warnings dispatched"
        );
        report
    }
}

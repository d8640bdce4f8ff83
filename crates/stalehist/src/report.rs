// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing output on stdout. Logs go to stderr.

use std::io::Write;

use serde::Serialize;

use stalehist_config::StalehistConfig;
use stalehist_core::{AgeWindow, RecordId, StalehistError};
use stalehist_retention::{group_by_owner, Evaluation, OwnerBatch};

use crate::cleanup::RunSummary;

const SEPARATOR: &str = "*******************************";

/// How output is rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// List every owner and history instead of counts.
    pub verbose: bool,
    /// Emit one JSON document instead of text.
    pub json: bool,
}

fn io(e: std::io::Error) -> StalehistError {
    StalehistError::Internal(format!("writing output: {e}"))
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<(), StalehistError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StalehistError::Internal(format!("serializing output: {e}")))?;
    writeln!(out, "{json}").map_err(io)
}

#[derive(Serialize)]
struct ConfigView<'a> {
    host: Option<&'a str>,
    port: u16,
    dbname: &'a str,
    user: Option<&'a str>,
    warn_weeks: u32,
    delete_weeks: u32,
}

/// The six resolved store and threshold settings. The password is never shown.
pub fn write_config(
    out: &mut dyn Write,
    config: &StalehistConfig,
    output: Output,
) -> Result<(), StalehistError> {
    let view = ConfigView {
        host: config.store.host.as_deref(),
        port: config.store.port,
        dbname: &config.store.dbname,
        user: config.store.user.as_deref(),
        warn_weeks: config.retention.warn_weeks,
        delete_weeks: config.retention.delete_weeks,
    };
    if output.json {
        return write_json(out, &view);
    }
    config_text(out, &view).map_err(io)
}

fn config_text(out: &mut dyn Write, view: &ConfigView<'_>) -> std::io::Result<()> {
    writeln!(out, "Database host name: {}", view.host.unwrap_or("-"))?;
    writeln!(out, "Database port: {}", view.port)?;
    writeln!(out, "Database name: {}", view.dbname)?;
    writeln!(out, "Database user: {}", view.user.unwrap_or("-"))?;
    writeln!(out, "Warning threshold: {} weeks", view.warn_weeks)?;
    writeln!(out, "Delete threshold: {} weeks", view.delete_weeks)
}

#[derive(Serialize)]
struct HistoryView<'a> {
    id: RecordId,
    name: &'a str,
}

#[derive(Serialize)]
struct OwnerView<'a> {
    username: &'a str,
    email: &'a str,
    histories: Vec<HistoryView<'a>>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    warn_weeks: u32,
    delete_weeks: u32,
    users_to_warn: usize,
    histories_to_warn: usize,
    histories_to_delete: usize,
    warn: Vec<OwnerView<'a>>,
    delete: Vec<HistoryView<'a>>,
}

/// What a run would do, without doing it.
pub fn write_report(
    out: &mut dyn Write,
    evaluation: &Evaluation,
    window: AgeWindow,
    output: Output,
) -> Result<(), StalehistError> {
    let batches = group_by_owner(&evaluation.warn);

    if output.json {
        let view = ReportView {
            warn_weeks: window.warn_weeks(),
            delete_weeks: window.delete_weeks(),
            users_to_warn: batches.len(),
            histories_to_warn: evaluation.warn.len(),
            histories_to_delete: evaluation.delete.len(),
            warn: batches
                .iter()
                .map(|b| OwnerView {
                    username: &b.owner.username,
                    email: &b.owner.email,
                    histories: b
                        .records
                        .iter()
                        .map(|r| HistoryView { id: r.id, name: &r.name })
                        .collect(),
                })
                .collect(),
            delete: evaluation
                .delete
                .iter()
                .map(|r| HistoryView { id: r.id, name: &r.name })
                .collect(),
        };
        return write_json(out, &view);
    }

    report_text(out, evaluation, &batches, window, output.verbose).map_err(io)
}

fn report_text(
    out: &mut dyn Write,
    evaluation: &Evaluation,
    batches: &[OwnerBatch],
    window: AgeWindow,
    verbose: bool,
) -> std::io::Result<()> {
    let warn_weeks = window.warn_weeks();
    let delete_weeks = window.delete_weeks();

    writeln!(out, "{SEPARATOR}")?;
    if verbose {
        writeln!(
            out,
            "The following users will get warnings (Histories are {warn_weeks} weeks old):"
        )?;
        for batch in batches {
            writeln!(out, "User: {}, {}", batch.owner.username, batch.owner.email)?;
            for record in &batch.records {
                writeln!(out, "\tHistory: {}\t{}", record.id, record.name)?;
            }
        }
    } else {
        writeln!(
            out,
            "Number of users with {warn_weeks} week old histories to be warned and number of histories to be warned about:"
        )?;
    }
    writeln!(out, "Users to be warned: {}", batches.len())?;
    writeln!(out, "Histories to be warned about: {}", evaluation.warn.len())?;
    writeln!(out, "{SEPARATOR}")?;
    if verbose {
        writeln!(
            out,
            "The following {delete_weeks} weeks old histories would be marked as deleted:"
        )?;
        for record in &evaluation.delete {
            writeln!(out, "History: {}\t{}", record.id, record.name)?;
        }
    } else {
        writeln!(
            out,
            "The number of {delete_weeks} weeks old histories to be marked as deleted: {}",
            evaluation.delete.len()
        )?;
    }
    Ok(())
}

/// What an executed run did.
pub fn write_summary(
    out: &mut dyn Write,
    summary: &RunSummary,
    output: Output,
) -> Result<(), StalehistError> {
    if output.json {
        return write_json(out, summary);
    }

    summary_text(out, summary, output.verbose).map_err(io)
}

fn summary_text(out: &mut dyn Write, summary: &RunSummary, verbose: bool) -> std::io::Result<()> {
    if summary.deletion_skipped {
        writeln!(out, "Deletion skipped: marking histories deleted did not complete")?;
    } else {
        writeln!(out, "Histories marked as deleted: {}", summary.deleted)?;
    }
    writeln!(out, "Users warned: {}", summary.warned_owners)?;
    writeln!(out, "Histories warned about: {}", summary.warned_records)?;
    if let Some(dispatch) = &summary.dispatch {
        if !dispatch.is_clean() {
            writeln!(out, "Warnings that could not be sent: {}", dispatch.failed.len())?;
            if verbose {
                for failure in &dispatch.failed {
                    writeln!(out, "\tUser {}: {}", failure.owner, failure.error)?;
                }
            }
        }
    }
    Ok(())
}

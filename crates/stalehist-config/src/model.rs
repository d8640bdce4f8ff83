// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the stalehist retention job.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Keys without a `default` are required and a
//! missing one is reported before any store or mail I/O happens.

use serde::{Deserialize, Serialize};
use stalehist_core::{AgeWindow, StalehistError, StoreBackend};

/// Top-level stalehist configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StalehistConfig {
    /// Human-readable server name used in mail subjects, e.g. `Galaxy Australia`.
    pub server_label: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Record store connection settings.
    pub store: StoreConfig,

    /// Outbound mail settings.
    pub mail: MailConfig,

    /// Retention thresholds.
    pub retention: RetentionConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Record store connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Backend holding the histories.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database server host. Required for PostgreSQL.
    #[serde(default)]
    pub host: Option<String>,

    /// Database server port.
    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Database name, or the database file path for SQLite.
    pub dbname: String,

    /// Database user. Required for PostgreSQL.
    #[serde(default)]
    pub user: Option<String>,

    /// Database password.
    #[serde(default)]
    pub password: Option<String>,

    /// Upper bound for connecting and for each query, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_store_port() -> u16 {
    5432
}

fn default_timeout_secs() -> u64 {
    30
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// SMTP relay host.
    pub host: String,

    /// SMTP relay port.
    #[serde(default = "default_mail_port")]
    pub port: u16,

    /// Sender address for warnings.
    pub from_address: String,

    /// Address owners are told to reply to.
    pub response_address: String,

    /// Operator addresses that receive a blind copy of every warning.
    #[serde(default)]
    pub bcc: Vec<String>,

    /// Upgrade the relay connection with STARTTLS.
    #[serde(default)]
    pub starttls: bool,

    /// SMTP user, if the relay requires authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password, if the relay requires authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Upper bound for delivering one message, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_mail_port() -> u16 {
    25
}

/// Retention thresholds in weeks of inactivity.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Age at which owners are warned.
    pub warn_weeks: u32,

    /// Age at which histories are marked deleted.
    pub delete_weeks: u32,
}

impl RetentionConfig {
    /// The validated [`AgeWindow`] for these thresholds.
    pub fn window(&self) -> Result<AgeWindow, StalehistError> {
        AgeWindow::new(self.warn_weeks, self.delete_weeks)
    }
}

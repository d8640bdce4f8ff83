// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the gateway, the policy engine, and the notifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::StalehistError;

/// Identity of a history record in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the user owning one or more histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user a history belongs to. Read-only to stalehist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub username: String,
    pub email: String,
}

/// A history as returned by the record store.
///
/// Only live histories are ever returned: not deleted, not published, and
/// not shared with other users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub owner: Owner,
    pub updated_at: DateTime<Utc>,
}

/// The pair of retention thresholds, in weeks of inactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeWindow {
    warn_weeks: u32,
    delete_weeks: u32,
}

impl AgeWindow {
    /// Builds a window, rejecting any pair where `warn_weeks >= delete_weeks`.
    pub fn new(warn_weeks: u32, delete_weeks: u32) -> Result<Self, StalehistError> {
        if warn_weeks >= delete_weeks {
            return Err(StalehistError::InvalidWindow {
                warn_weeks,
                delete_weeks,
            });
        }
        Ok(Self {
            warn_weeks,
            delete_weeks,
        })
    }

    pub fn warn_weeks(&self) -> u32 {
        self.warn_weeks
    }

    pub fn delete_weeks(&self) -> u32 {
        self.delete_weeks
    }

    /// Weeks an owner has between the warning and the deletion.
    pub fn grace_weeks(&self) -> u32 {
        self.delete_weeks - self.warn_weeks
    }
}

/// Which relational backend holds the histories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Sqlite,
}

/// A rendered plaintext message ready for a [`crate::MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub from: String,
    pub reply_to: Option<String>,
    pub to: String,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the stalehist retention job.

use thiserror::Error;

/// The primary error type used across stalehist collaborators and the cleanup run.
#[derive(Debug, Error)]
pub enum StalehistError {
    /// Configuration is unusable (missing file, missing key, bad value).
    #[error("configuration error: {0}")]
    Config(String),

    /// The retention thresholds do not satisfy `warn_weeks < delete_weeks`.
    #[error("invalid age window: warn_weeks ({warn_weeks}) must be less than delete_weeks ({delete_weeks})")]
    InvalidWindow { warn_weeks: u32, delete_weeks: u32 },

    /// The record store could not be reached or refused the credentials.
    #[error("store connection error: {source}")]
    Connection {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A read query against the record store failed.
    #[error("store query `{context}` failed: {source}")]
    Query {
        context: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The delete transaction failed and was rolled back.
    #[error("delete commit rolled back: {source}")]
    Commit {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A notification could not be delivered to one recipient.
    #[error("mail dispatch to {recipient} failed: {source}")]
    Dispatch {
        recipient: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A bounded store or mail operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StalehistError {
    /// Whether a failed `mark_deleted` lets the run go on without deleting.
    ///
    /// A rolled back or timed out delete is retried by the next run; any
    /// other store error ends the run.
    pub fn skips_deletion(&self) -> bool {
        matches!(self, Self::Commit { .. } | Self::Timeout { .. })
    }

    /// Builds a [`StalehistError::Query`] from any error with the failing query's name.
    pub fn query(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Query {
            context: context.into(),
            source: source.into(),
        }
    }
}

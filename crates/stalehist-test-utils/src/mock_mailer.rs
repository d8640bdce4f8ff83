// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mail transport for testing.
//!
//! Captures every delivered message for later assertions and rejects
//! messages to recipients registered with [`MockMailer::reject`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use stalehist_core::{MailTransport, OutboundMail, StalehistError};

/// Mock mail transport.
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<OutboundMail>>>,
    rejected: Arc<Mutex<HashSet<String>>>,
    attempts: Arc<Mutex<usize>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every message addressed to `recipient`.
    pub async fn reject(&self, recipient: impl Into<String>) {
        self.rejected.lock().await.insert(recipient.into());
    }

    /// Messages delivered so far.
    pub async fn sent_messages(&self) -> Vec<OutboundMail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Delivery attempts, successful or not.
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl MailTransport for MockMailer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, mail: &OutboundMail) -> Result<(), StalehistError> {
        *self.attempts.lock().await += 1;
        if self.rejected.lock().await.contains(&mail.to) {
            return Err(StalehistError::Dispatch {
                recipient: mail.to.clone(),
                source: "550 mailbox unavailable".into(),
            });
        }
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

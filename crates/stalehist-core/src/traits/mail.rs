// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail transport trait.

use async_trait::async_trait;

use crate::error::StalehistError;
use crate::types::OutboundMail;

/// Delivers rendered plaintext messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name of the transport, for logs.
    fn name(&self) -> &str;

    /// Sends one message. Failures are reported as [`StalehistError::Dispatch`].
    async fn send(&self, mail: &OutboundMail) -> Result<(), StalehistError>;
}

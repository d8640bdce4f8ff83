// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery through `lettre`.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use stalehist_config::model::MailConfig;
use stalehist_core::{MailTransport, OutboundMail, StalehistError};

/// Delivers warnings to the configured relay.
///
/// The relay is contacted lazily on the first send, so building the
/// transport performs no I/O.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, StalehistError> {
        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
                StalehistError::Config(format!("mail.host `{}`: {e}", config.host))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(user), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        debug!(host = %config.host, port = config.port, starttls = config.starttls, "smtp transport configured");
        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Builds the RFC 5322 message for `mail`.
fn build_message(mail: &OutboundMail) -> Result<Message, StalehistError> {
    let dispatch = |e: Box<dyn std::error::Error + Send + Sync>| StalehistError::Dispatch {
        recipient: mail.to.clone(),
        source: e,
    };
    let mailbox = |addr: &str| addr.parse::<Mailbox>().map_err(|e| dispatch(Box::new(e)));

    let mut builder = Message::builder()
        .from(mailbox(mail.from.as_str())?)
        .to(mailbox(mail.to.as_str())?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(mailbox(reply_to.as_str())?);
    }
    for bcc in &mail.bcc {
        builder = builder.bcc(mailbox(bcc.as_str())?);
    }
    builder
        .body(mail.body.clone())
        .map_err(|e| dispatch(Box::new(e)))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, mail: &OutboundMail) -> Result<(), StalehistError> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| StalehistError::Dispatch {
                recipient: mail.to.clone(),
                source: Box::new(e),
            })?;
        Ok(())
    }
}

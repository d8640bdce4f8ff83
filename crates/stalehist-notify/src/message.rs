// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warning message rendering.

use std::time::Duration;

use stalehist_config::StalehistConfig;
use stalehist_core::{AgeWindow, OutboundMail, Owner, Record};

/// The configuration-supplied parts of every warning.
#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub server_label: String,
    pub from_address: String,
    pub response_address: String,
    pub bcc: Vec<String>,
    /// Upper bound for delivering one message.
    pub timeout: Duration,
}

impl NotifySettings {
    pub fn from_config(config: &StalehistConfig) -> Self {
        Self {
            server_label: config.server_label.clone(),
            from_address: config.mail.from_address.clone(),
            response_address: config.mail.response_address.clone(),
            bcc: config.mail.bcc.clone(),
            timeout: Duration::from_secs(config.mail.timeout_secs),
        }
    }

    pub fn subject(&self) -> String {
        format!("{} History Deletion Warning", self.server_label)
    }
}

/// Renders the warning for `owner` about `records`.
pub fn render(
    owner: &Owner,
    records: &[Record],
    window: AgeWindow,
    settings: &NotifySettings,
) -> OutboundMail {
    let grace = window.grace_weeks();
    let label = &settings.server_label;

    let mut listing = String::new();
    for record in records {
        listing.push_str(&format!("{}\t{}\n", record.id, record.name));
    }

    let body = format!(
        "Dear {username},\n\n\
         The following histories on {label} have not been updated for {warn} weeks:\n\n\
         {listing}\n\
         They will be marked as deleted in {grace} {unit} unless they are used again.\n\
         To keep a history, update it (for example by running a tool or renaming it), \
         publish it, or share it with another user.\n\n\
         Questions about this message can be sent to {response}.\n\n\
         {label} administrators\n",
        username = owner.username,
        warn = window.warn_weeks(),
        unit = if grace == 1 { "week" } else { "weeks" },
        response = settings.response_address,
    );

    OutboundMail {
        from: settings.from_address.clone(),
        reply_to: Some(settings.response_address.clone()),
        to: owner.email.clone(),
        bcc: settings.bcc.clone(),
        subject: settings.subject(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stalehist_core::RecordId;
    use stalehist_test_utils::fixtures::{owner, test_config};

    fn record(id: i64, name: &str, owner: &Owner) -> Record {
        Record {
            id: RecordId(id),
            name: name.to_string(),
            owner: owner.clone(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn headers_come_from_owner_and_settings() {
        let settings = NotifySettings::from_config(&test_config());
        let alice = owner(1, "alice");
        let mail = render(
            &alice,
            &[record(7, "RNA-seq", &alice)],
            AgeWindow::new(11, 13).unwrap(),
            &settings,
        );

        assert_eq!(mail.to, "alice@example.org");
        assert_eq!(mail.from, "noreply@example.org");
        assert_eq!(mail.reply_to.as_deref(), Some("help@example.org"));
        assert_eq!(mail.bcc, vec!["ops@example.org".to_string()]);
        assert_eq!(mail.subject, "Galaxy Test History Deletion Warning");
    }

    #[test]
    fn body_lists_histories_and_grace_period() {
        let settings = NotifySettings::from_config(&test_config());
        let alice = owner(1, "alice");
        let mail = render(
            &alice,
            &[record(7, "RNA-seq", &alice), record(9, "Unnamed history", &alice)],
            AgeWindow::new(11, 13).unwrap(),
            &settings,
        );

        assert!(mail.body.starts_with("Dear alice,\n"));
        assert!(mail.body.contains("not been updated for 11 weeks"));
        assert!(mail.body.contains("7\tRNA-seq\n"));
        assert!(mail.body.contains("9\tUnnamed history\n"));
        assert!(mail.body.contains("in 2 weeks unless"));
        assert!(mail.body.contains("sent to help@example.org."));
    }

    #[test]
    fn one_week_grace_is_singular() {
        let settings = NotifySettings::from_config(&test_config());
        let alice = owner(1, "alice");
        let mail = render(
            &alice,
            &[record(1, "a", &alice)],
            AgeWindow::new(3, 4).unwrap(),
            &settings,
        );
        assert!(mail.body.contains("in 1 week unless"));
    }

    #[test]
    fn full_body_layout() {
        let settings = NotifySettings::from_config(&test_config());
        let bob = owner(2, "bob");
        let mail = render(
            &bob,
            &[record(4, "ChIP", &bob)],
            AgeWindow::new(11, 13).unwrap(),
            &settings,
        );

        assert_eq!(
            mail.body,
            "Dear bob,\n\
             \n\
             The following histories on Galaxy Test have not been updated for 11 weeks:\n\
             \n\
             4\tChIP\n\
             \n\
             They will be marked as deleted in 2 weeks unless they are used again.\n\
             To keep a history, update it (for example by running a tool or renaming it), \
             publish it, or share it with another user.\n\
             \n\
             Questions about this message can be sent to help@example.org.\n\
             \n\
             Galaxy Test administrators\n"
        );
    }
}

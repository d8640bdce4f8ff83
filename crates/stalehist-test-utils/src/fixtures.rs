// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made owners and configuration for tests.

use stalehist_config::model::{MailConfig, RetentionConfig, StalehistConfig, StoreConfig};
use stalehist_core::{Owner, OwnerId, StoreBackend};

/// An owner with username `username` and mail `{username}@example.org`.
pub fn owner(id: i64, username: &str) -> Owner {
    Owner {
        id: OwnerId(id),
        username: username.to_string(),
        email: format!("{username}@example.org"),
    }
}

/// A valid PostgreSQL configuration with an 11/13 week window.
pub fn test_config() -> StalehistConfig {
    StalehistConfig {
        server_label: "Galaxy Test".to_string(),
        log_level: "info".to_string(),
        store: StoreConfig {
            backend: StoreBackend::Postgres,
            host: Some("db.example.org".to_string()),
            port: 5432,
            dbname: "galaxy".to_string(),
            user: Some("galaxy".to_string()),
            password: Some("hunter2".to_string()),
            timeout_secs: 30,
        },
        mail: MailConfig {
            host: "localhost".to_string(),
            port: 25,
            from_address: "noreply@example.org".to_string(),
            response_address: "help@example.org".to_string(),
            bcc: vec!["ops@example.org".to_string()],
            starttls: false,
            username: None,
            password: None,
            timeout_secs: 30,
        },
        retention: RetentionConfig {
            warn_weeks: 11,
            delete_weeks: 13,
        },
    }
}

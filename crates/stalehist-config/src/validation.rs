// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering, backend-specific required keys, and address shape.

use stalehist_core::StoreBackend;

use crate::diagnostic::ConfigError;
use crate::model::StalehistConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StalehistConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server_label.trim().is_empty() {
        errors.push(invalid("server_label must not be empty".to_string()));
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        errors.push(invalid(format!(
            "log_level `{}` must be one of {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    // Thresholds
    let retention = &config.retention;
    if retention.warn_weeks >= retention.delete_weeks {
        errors.push(invalid(format!(
            "retention.warn_weeks ({}) must be less than retention.delete_weeks ({})",
            retention.warn_weeks, retention.delete_weeks
        )));
    }

    // Store
    let store = &config.store;
    if store.dbname.trim().is_empty() {
        errors.push(invalid("store.dbname must not be empty".to_string()));
    }
    if store.backend == StoreBackend::Postgres {
        if is_blank(store.host.as_deref()) {
            errors.push(ConfigError::MissingKey {
                key: "store.host".to_string(),
            });
        }
        if is_blank(store.user.as_deref()) {
            errors.push(ConfigError::MissingKey {
                key: "store.user".to_string(),
            });
        }
    }
    if store.timeout_secs == 0 {
        errors.push(invalid("store.timeout_secs must be at least 1".to_string()));
    }

    // Mail
    let mail = &config.mail;
    if mail.host.trim().is_empty() {
        errors.push(invalid("mail.host must not be empty".to_string()));
    }
    check_address(&mut errors, "mail.from_address", &mail.from_address);
    check_address(&mut errors, "mail.response_address", &mail.response_address);
    for (i, addr) in mail.bcc.iter().enumerate() {
        check_address(&mut errors, &format!("mail.bcc[{i}]"), addr);
    }
    if mail.username.is_some() != mail.password.is_some() {
        errors.push(invalid(
            "mail.username and mail.password must be set together".to_string(),
        ));
    }
    if mail.timeout_secs == 0 {
        errors.push(invalid("mail.timeout_secs must be at least 1".to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn check_address(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    let value = value.trim();
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !well_formed {
        errors.push(invalid(format!("{key} `{value}` is not a mail address")));
    }
}

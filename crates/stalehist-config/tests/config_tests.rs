// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the stalehist configuration system.

use stalehist_config::diagnostic::ConfigError;
use stalehist_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use stalehist_core::StoreBackend;

const FULL: &str = r#"
server_label = "Galaxy Australia"
log_level = "debug"

[store]
host = "db.example.org"
port = 5433
dbname = "galaxy"
user = "galaxy"
password = "s3cret"

[mail]
host = "smtp.example.org"
port = 587
from_address = "noreply@example.org"
response_address = "help@example.org"
bcc = ["ops@example.org", "admin@example.org"]
starttls = true

[retention]
warn_weeks = 11
delete_weeks = 13
"#;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let config = load_config_from_str(FULL).expect("valid TOML should deserialize");
    assert_eq!(config.server_label, "Galaxy Australia");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.store.backend, StoreBackend::Postgres);
    assert_eq!(config.store.host.as_deref(), Some("db.example.org"));
    assert_eq!(config.store.port, 5433);
    assert_eq!(config.store.dbname, "galaxy");
    assert_eq!(config.store.user.as_deref(), Some("galaxy"));
    assert_eq!(config.store.password.as_deref(), Some("s3cret"));
    assert_eq!(config.mail.port, 587);
    assert_eq!(config.mail.bcc.len(), 2);
    assert!(config.mail.starttls);
    assert_eq!(config.retention.warn_weeks, 11);
    assert_eq!(config.retention.delete_weeks, 13);

    let window = config.retention.window().unwrap();
    assert_eq!(window.grace_weeks(), 2);
}

/// Optional keys fall back to defaults.
#[test]
fn optional_keys_use_defaults() {
    let toml = r#"
server_label = "Galaxy"

[store]
backend = "sqlite"
dbname = "/tmp/universe.sqlite"

[mail]
host = "localhost"
from_address = "noreply@example.org"
response_address = "help@example.org"

[retention]
warn_weeks = 4
delete_weeks = 6
"#;
    let config = load_and_validate_str(toml).expect("minimal sqlite config is valid");
    assert_eq!(config.log_level, "info");
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.port, 5432);
    assert_eq!(config.store.timeout_secs, 30);
    assert!(config.store.host.is_none());
    assert_eq!(config.mail.port, 25);
    assert!(config.mail.bcc.is_empty());
    assert!(!config.mail.starttls);
    assert_eq!(config.mail.timeout_secs, 30);
}

/// A missing required key is reported with its section before anything else runs.
#[test]
fn missing_required_key_is_reported() {
    let toml = FULL.replace("delete_weeks = 13\n", "");
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "retention.delete_weeks")),
        "got: {errors:?}"
    );
}

/// A missing required section is reported.
#[test]
fn missing_mail_section_is_reported() {
    let toml = r#"
server_label = "Galaxy"

[store]
backend = "sqlite"
dbname = "x.sqlite"

[retention]
warn_weeks = 1
delete_weeks = 2
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::MissingKey { key } if key == "mail")));
}

/// Unknown keys are rejected with a suggestion.
#[test]
fn unknown_key_gets_a_suggestion() {
    let toml = FULL.replace("warn_weeks = 11", "warn_week = 11");
    let errors = load_and_validate_str(&toml).unwrap_err();
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("unknown key error");
    assert_eq!(unknown.0, "warn_week");
    assert_eq!(unknown.1.as_deref(), Some("warn_weeks"));
}

/// A string where a number is expected is an invalid type.
#[test]
fn wrong_type_is_reported() {
    let toml = FULL.replace("warn_weeks = 11", "warn_weeks = \"eleven\"");
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("warn_weeks"))));
}

/// Thresholds in the wrong order fail validation.
#[test]
fn inverted_thresholds_fail_validation() {
    let toml = FULL.replace("warn_weeks = 11", "warn_weeks = 14");
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("warn_weeks"))
    ));
}

/// A path that does not exist is reported as unreadable.
#[test]
fn missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let errors = load_and_validate_path(&path).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ConfigError::Unreadable { path: p, .. } if p.ends_with("nope.toml")));
}

/// Environment variables override file values, with underscores kept inside key names.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("stalehist.toml", FULL)?;
        jail.set_env("STALEHIST_STORE_HOST", "replica.example.org");
        jail.set_env("STALEHIST_MAIL_FROM_ADDRESS", "galaxy@example.org");
        jail.set_env("STALEHIST_RETENTION_WARN_WEEKS", "10");

        let config = load_and_validate_path(std::path::Path::new("stalehist.toml"))
            .map_err(|e| format!("{e:?}"))?;
        assert_eq!(config.store.host.as_deref(), Some("replica.example.org"));
        assert_eq!(config.mail.from_address, "galaxy@example.org");
        assert_eq!(config.retention.warn_weeks, 10);
        assert_eq!(config.retention.delete_weeks, 13);
        Ok(())
    });
}

/// Upper-case section variables reach their section instead of failing as unknown keys.
#[test]
fn env_store_password_overrides_the_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("stalehist.toml", FULL)?;
        jail.set_env("STALEHIST_STORE_PASSWORD", "from-env");
        jail.set_env("STALEHIST_RETENTION_DELETE_WEEKS", "15");

        let config = load_and_validate_path(std::path::Path::new("stalehist.toml"))
            .map_err(|e| format!("{e:?}"))?;
        assert_eq!(config.store.password.as_deref(), Some("from-env"));
        assert_eq!(config.retention.delete_weeks, 15);
        assert_eq!(config.retention.warn_weeks, 11);
        Ok(())
    });
}

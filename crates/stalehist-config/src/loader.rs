// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./stalehist.toml` > `~/.config/stalehist/stalehist.toml` >
//! `/etc/stalehist/stalehist.toml` with environment variable overrides via `STALEHIST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use crate::model::StalehistConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/stalehist/stalehist.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "stalehist.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. `/etc/stalehist/stalehist.toml` (system-wide)
/// 2. `~/.config/stalehist/stalehist.toml` (user XDG config)
/// 3. `./stalehist.toml` (local directory)
/// 4. `STALEHIST_*` environment variables
pub fn load_config() -> Result<StalehistConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StalehistConfig, figment::Error> {
    Figment::new().merge(Toml::string(toml_content)).extract()
}

/// Load configuration from already-read file contents with env var overrides.
///
/// The caller reads the file so that a missing or unreadable path is
/// reported as such instead of as a pile of missing keys.
pub fn load_config_from_contents(toml_content: &str) -> Result<StalehistConfig, figment::Error> {
    Figment::new()
        .merge(Toml::string(toml_content))
        .merge(env_provider())
        .extract()
}

/// The layered Figment behind [`load_config`].
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("stalehist").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `STALEHIST_*` variables, mapped to dotted keys by section prefix.
///
/// Key names contain underscores: `STALEHIST_MAIL_FROM_ADDRESS` is
/// `mail.from_address`, never `mail.from.address`.
fn env_provider() -> Env {
    Env::prefixed("STALEHIST_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to its dotted config key.
///
/// Figment hands the name over in its original case.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["store", "mail", "retention"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("store_host"), "store.host");
        assert_eq!(map_env_key("mail_from_address"), "mail.from_address");
        assert_eq!(map_env_key("retention_warn_weeks"), "retention.warn_weeks");
        assert_eq!(map_env_key("server_label"), "server_label");
        assert_eq!(map_env_key("log_level"), "log_level");
    }

    #[test]
    fn env_keys_are_matched_case_insensitively() {
        assert_eq!(map_env_key("STORE_PASSWORD"), "store.password");
        assert_eq!(map_env_key("MAIL_FROM_ADDRESS"), "mail.from_address");
        assert_eq!(map_env_key("RETENTION_DELETE_WEEKS"), "retention.delete_weeks");
        assert_eq!(map_env_key("SERVER_LABEL"), "server_label");
    }

    #[test]
    fn section_name_prefix_without_underscore_is_untouched() {
        assert_eq!(map_env_key("mailbox"), "mailbox");
    }
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store gateways for the stalehist retention job.
//!
//! Galaxy keeps histories in PostgreSQL in production and in SQLite for
//! small installs. Both gateways run the same three statements: two stale
//! history reads and one transactional `deleted` update.

pub mod database;
pub mod postgres;
pub mod queries;
pub mod sqlite;

use std::time::Duration;

use stalehist_config::model::StoreConfig;
use stalehist_core::{StalehistError, StoreBackend, StoreConnector};

pub use database::Database;
pub use postgres::{PostgresConnector, PostgresRecordStore};
pub use sqlite::{SqliteConnector, SqliteRecordStore};

/// Build the connector for the configured backend. Performs no I/O.
pub fn connector_from_config(
    config: &StoreConfig,
) -> Result<Box<dyn StoreConnector>, StalehistError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    match config.backend {
        StoreBackend::Postgres => {
            let host = config
                .host
                .clone()
                .ok_or_else(|| StalehistError::Config("store.host is required for postgres".into()))?;
            let user = config
                .user
                .clone()
                .ok_or_else(|| StalehistError::Config("store.user is required for postgres".into()))?;
            Ok(Box::new(PostgresConnector::new(
                host,
                config.port,
                config.dbname.clone(),
                user,
                config.password.clone(),
                timeout,
            )))
        }
        StoreBackend::Sqlite => Ok(Box::new(SqliteConnector::new(
            config.dbname.clone(),
            timeout,
        ))),
    }
}

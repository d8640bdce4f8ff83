// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection management.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. A cleanup run opens exactly one `Database` and closes it before
//! any mail is sent.

use rusqlite::OpenFlags;
use stalehist_core::StalehistError;
use tracing::debug;

/// A single SQLite connection to an existing Galaxy database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open an existing database file for reading and writing.
    ///
    /// The file is never created: a missing database is a connection error,
    /// not an empty store.
    pub async fn open(path: &str) -> Result<Self, StalehistError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = tokio_rusqlite::Connection::open_with_flags(path, flags)
            .await
            .map_err(|e| StalehistError::Connection {
                source: format!("cannot open {path}: {e}").into(),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
            Ok(())
        })
        .await
        .map_err(|e| StalehistError::Connection {
            source: e.to_string().into(),
        })?;

        debug!(path, "sqlite database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection. Pending statements finish first.
    pub async fn close(self) -> Result<(), StalehistError> {
        self.conn
            .close()
            .await
            .map_err(|e| StalehistError::Internal(format!("closing sqlite connection: {e}")))
    }
}

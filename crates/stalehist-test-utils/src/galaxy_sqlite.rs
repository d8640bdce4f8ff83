// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal Galaxy SQLite schema for gateway tests.
//!
//! Only the columns stalehist reads or writes are present. Timestamps are
//! stored the way Galaxy stores them on SQLite: `YYYY-MM-DD HH:MM:SS.fff`
//! text in UTC.

use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const SCHEMA: &str = "
    CREATE TABLE galaxy_user (
        id INTEGER PRIMARY KEY,
        username TEXT,
        email TEXT NOT NULL
    );
    CREATE TABLE history (
        id INTEGER PRIMARY KEY,
        user_id INTEGER REFERENCES galaxy_user(id),
        name TEXT,
        update_time TIMESTAMP NOT NULL,
        deleted BOOLEAN NOT NULL DEFAULT 0,
        published BOOLEAN NOT NULL DEFAULT 0
    );
    CREATE TABLE history_user_share_association (
        id INTEGER PRIMARY KEY,
        history_id INTEGER REFERENCES history(id),
        user_id INTEGER REFERENCES galaxy_user(id)
    );
";

/// Creates a database file with [`SCHEMA`] and runs `seed` against it.
///
/// Returns the file path and the directory guard; the file disappears when
/// the guard is dropped.
pub fn fixture_db(seed: impl FnOnce(&Connection)) -> (String, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("galaxy.sqlite");
    let conn = Connection::open(&path).expect("create fixture database");
    conn.execute_batch(SCHEMA).expect("create fixture schema");
    seed(&conn);
    drop(conn);
    (path.to_string_lossy().into_owned(), dir)
}

/// Inserts a history last updated `age_days` ago, creating its owner
/// `user{user_id}` on first use.
pub fn insert_history(
    conn: &Connection,
    id: i64,
    user_id: i64,
    name: &str,
    age_days: f64,
    deleted: bool,
    published: bool,
) {
    conn.execute(
        "INSERT OR IGNORE INTO galaxy_user (id, username, email) VALUES (?1, ?2, ?3)",
        params![
            user_id,
            format!("user{user_id}"),
            format!("user{user_id}@example.org")
        ],
    )
    .expect("insert owner");
    conn.execute(
        "INSERT INTO history (id, user_id, name, update_time, deleted, published)
         VALUES (?1, ?2, ?3, strftime('%Y-%m-%d %H:%M:%f', 'now', ?4), ?5, ?6)",
        params![id, user_id, name, age_modifier(age_days), deleted, published],
    )
    .expect("insert history");
}

/// Shares history `id` with user `with_user`.
pub fn share_history(conn: &Connection, id: i64, with_user: i64) {
    conn.execute(
        "INSERT INTO history_user_share_association (history_id, user_id) VALUES (?1, ?2)",
        params![id, with_user],
    )
    .expect("share history");
}

/// Moves the last update of history `id` to `age_days` ago.
pub fn set_history_age(path: &str, id: i64, age_days: f64) {
    let conn = Connection::open(path).expect("open fixture database");
    conn.execute(
        "UPDATE history SET update_time = strftime('%Y-%m-%d %H:%M:%f', 'now', ?1) WHERE id = ?2",
        params![age_modifier(age_days), id],
    )
    .expect("age history");
}

/// Reads the `deleted` flag of history `id` straight from the file.
pub fn history_deleted(path: &str, id: i64) -> bool {
    let conn = Connection::open(path).expect("open fixture database");
    conn.query_row(
        "SELECT deleted FROM history WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .expect("read deleted flag")
}

fn age_modifier(age_days: f64) -> String {
    format!("-{} seconds", (age_days * 86_400.0).round() as i64)
}

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for stalehist integration tests.
//!
//! Provides in-memory collaborators and fixtures for fast, deterministic,
//! CI-runnable tests without a database server or an SMTP relay.
//!
//! # Components
//!
//! - [`MockStore`] - In-memory history table with a controllable clock,
//!   failure injection and call counters
//! - [`MockMailer`] - Mail transport capturing every message it is handed
//! - [`galaxy_sqlite`] - Minimal Galaxy SQLite schema in a temp directory
//! - [`fixtures`] - Owners, records and a ready-to-use configuration

pub mod fixtures;
pub mod galaxy_sqlite;
pub mod mock_mailer;
pub mod mock_store;

pub use mock_mailer::MockMailer;
pub use mock_store::{MockStore, StoreCalls};

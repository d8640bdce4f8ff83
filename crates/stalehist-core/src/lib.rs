// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the stalehist retention job.
//!
//! This crate provides the error taxonomy, the domain types, and the narrow
//! collaborator traits (record store, mail transport) used throughout the
//! stalehist workspace. Concrete backends implement the traits defined here.

pub mod error;
pub mod timeout;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StalehistError;
pub use timeout::bounded;
pub use types::{AgeWindow, OutboundMail, Owner, OwnerId, Record, RecordId, StoreBackend};

pub use traits::{MailTransport, RecordStore, StoreConnector};

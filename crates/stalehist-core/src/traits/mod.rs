// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow collaborator traits the cleanup run consumes.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod mail;
pub mod store;

pub use mail::MailTransport;
pub use store::{RecordStore, StoreConnector};

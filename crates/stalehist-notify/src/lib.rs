// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner notification for the stalehist retention job.
//!
//! One plaintext warning per owner lists the histories that crossed the
//! warn threshold and says how long the owner has before they are marked
//! deleted. A failed delivery to one owner never stops delivery to the
//! rest; every outcome lands in a [`DispatchReport`].

pub mod message;
pub mod notifier;
pub mod smtp;

pub use message::{render, NotifySettings};
pub use notifier::{DispatchFailure, DispatchReport, Notifier};
pub use smtp::SmtpTransport;

// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention policy engine for stalehist.
//!
//! Decides which histories are due a warning and which are due deletion,
//! using nothing but the store's stale-history query. Every function here
//! is a pure read and safe to call repeatedly.
//!
//! A history is warned about on the one weekly run after it crosses
//! `warn_weeks` of inactivity: the warn set is the histories stale at
//! `warn_weeks` minus those already stale at `warn_weeks + 1`. Nothing
//! records that a warning went out, so the job has to run at least once a
//! week or a history can pass through its warn window unseen.

pub mod grouping;
pub mod policy;

pub use grouping::{group_by_owner, OwnerBatch};
pub use policy::{delete_set, evaluate, subtract, warn_set, Evaluation};

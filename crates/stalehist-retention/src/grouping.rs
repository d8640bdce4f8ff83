// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-owner batching of the warn set.

use std::collections::HashMap;

use serde::Serialize;
use stalehist_core::{Owner, OwnerId, Record};

/// Every warned history of one owner; becomes one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerBatch {
    pub owner: Owner,
    pub records: Vec<Record>,
}

/// Groups records by owner.
///
/// Batches appear in the order their owner is first seen, and records keep
/// their input order inside a batch.
pub fn group_by_owner(records: &[Record]) -> Vec<OwnerBatch> {
    let mut batches: Vec<OwnerBatch> = Vec::new();
    let mut index: HashMap<OwnerId, usize> = HashMap::new();

    for record in records {
        match index.get(&record.owner.id) {
            Some(&i) => batches[i].records.push(record.clone()),
            None => {
                index.insert(record.owner.id, batches.len());
                batches.push(OwnerBatch {
                    owner: record.owner.clone(),
                    records: vec![record.clone()],
                });
            }
        }
    }
    batches
}

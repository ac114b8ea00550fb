//! Which hashes this node is responsible for, and with whom.

use std::collections::HashMap;

use crate::common::Id;

#[derive(Debug, Default)]
/// Content hash to the other peers sharing responsibility for it, closest first.
///
/// A hash is present only while the local node believes itself responsible.
pub(crate) struct ResponsibilityTable {
    entries: HashMap<Id, Vec<Id>>,
}

impl ResponsibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: Id, overlap: Vec<Id>) {
        self.entries.insert(hash, overlap);
    }

    pub fn remove(&mut self, hash: &Id) -> bool {
        self.entries.remove(hash).is_some()
    }

    pub fn get(&self, hash: &Id) -> Option<&[Id]> {
        self.entries.get(hash).map(Vec::as_slice)
    }

    pub fn contains(&self, hash: &Id) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn hashes(&self) -> Vec<Id> {
        self.entries.keys().copied().collect()
    }

    /// Drop `peer` from every entry it appears in.
    pub fn remove_peer(&mut self, peer: &Id) {
        for overlap in self.entries.values_mut() {
            overlap.retain(|id| id != peer);
        }
    }
}

/// Given every candidate (self included) ordered closest first, return the
/// other members of the `redundancy` closest if `local_id` is one of them.
///
/// Fewer candidates than `redundancy` means everyone is in the close set.
pub(crate) fn close_set_overlap(
    local_id: &Id,
    ordered: Vec<Id>,
    redundancy: usize,
) -> Option<Vec<Id>> {
    let mut close_set = ordered;
    close_set.truncate(redundancy);

    let position = close_set.iter().position(|id| id == local_id)?;
    close_set.remove(position);

    Some(close_set)
}

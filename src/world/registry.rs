//! Everything locally known about other peers.

use std::collections::{HashMap, HashSet};

use ed25519_dalek::VerifyingKey;

use crate::common::{Contact, Id};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
/// What this node knows about another peer.
pub struct NodeRecord {
    contact: Contact,
    public_key: VerifyingKey,
    holding: HashSet<Id>,
}

impl NodeRecord {
    pub fn new(contact: Contact, public_key: VerifyingKey) -> Self {
        Self {
            contact,
            public_key,
            holding: HashSet::new(),
        }
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.contact.id
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Public key as it was announced. Never verified by the world model.
    pub fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }

    /// Hashes this peer has been observed or declared to hold.
    pub fn holding(&self) -> &HashSet<Id> {
        &self.holding
    }

    pub fn is_holding(&self, hash: &Id) -> bool {
        self.holding.contains(hash)
    }
}

#[derive(Debug, Default)]
/// Peer id to [NodeRecord] map. The local node is never part of it.
pub(crate) struct NodeRegistry {
    nodes: HashMap<Id, NodeRecord>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record, replacing (and returning) any previous one.
    pub fn add(&mut self, record: NodeRecord) -> Option<NodeRecord> {
        self.nodes.insert(*record.id(), record)
    }

    pub fn get(&self, id: &Id) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn remove(&mut self, id: &Id) -> Option<NodeRecord> {
        self.nodes.remove(id)
    }

    pub fn mark_holding(&mut self, id: &Id, hash: Id) -> Result<()> {
        let record = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(*id))?;
        record.holding.insert(hash);

        Ok(())
    }

    pub fn forget_holding(&mut self, id: &Id, hash: &Id) -> Result<bool> {
        let record = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(*id))?;

        Ok(record.holding.remove(hash))
    }

    pub fn is_holding(&self, id: &Id, hash: &Id) -> Result<bool> {
        self.nodes
            .get(id)
            .map(|record| record.is_holding(hash))
            .ok_or(Error::NodeNotFound(*id))
    }

    /// Ids of every known peer, in no particular order.
    pub fn ids(&self) -> Vec<Id> {
        self.nodes.keys().copied().collect()
    }

    /// Known peers believed to hold `hash`.
    pub fn holders(&self, hash: &Id) -> Vec<Id> {
        self.nodes
            .values()
            .filter(|record| record.is_holding(hash))
            .map(|record| *record.id())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

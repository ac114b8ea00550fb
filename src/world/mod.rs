//! This node's view of the network: known peers, what they hold, and which
//! hashes this node is responsible for.

mod registry;
mod responsibility;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ed25519_dalek::VerifyingKey;
use tracing::{debug, error, trace, warn};

use crate::common::{Contact, Id};
use crate::distance::{DistanceOrder, XorDistance};
use crate::{Error, Result};

pub use registry::NodeRecord;

use registry::NodeRegistry;
use responsibility::{close_set_overlap, ResponsibilityTable};

#[derive(Debug)]
struct State {
    nodes: NodeRegistry,
    responsible: ResponsibilityTable,
}

impl State {
    fn overlap(&self, hash: &Id, redundancy_enabled: bool) -> Vec<Id> {
        if redundancy_enabled {
            self.responsible
                .get(hash)
                .map(<[Id]>::to_vec)
                .unwrap_or_default()
        } else {
            self.nodes.ids()
        }
    }
}

#[derive(Debug)]
/// World model of a DHT node.
///
/// All state sits behind one readers-writer lock, so a responsibility
/// computation always sees a registry that no one else is mutating. Share it
/// between collaborators behind an [Arc](std::sync::Arc).
pub struct World<S, D = XorDistance> {
    id: Id,
    storage: S,
    distance: D,
    state: RwLock<State>,
}

impl<S> World<S, XorDistance> {
    /// Create an empty world model for the local node `id`, ordering peers
    /// by [XorDistance].
    pub fn new(id: Id, storage: S) -> Self {
        World {
            id,
            storage,
            distance: XorDistance,
            state: RwLock::new(State {
                nodes: NodeRegistry::new(),
                responsible: ResponsibilityTable::new(),
            }),
        }
    }
}

impl<S, D> World<S, D> {
    // === Options ===

    /// Replace the distance ordering, keeping any state already recorded.
    pub fn with_distance<T: DistanceOrder>(self, distance: T) -> World<S, T> {
        World {
            id: self.id,
            storage: self.storage,
            distance,
            state: RwLock::new(
                self.state
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner),
            ),
        }
    }

    // === Getters ===

    /// Returns the Id of the local node.
    pub fn local_id(&self) -> &Id {
        &self.id
    }

    /// Returns the local hash table handle this world model was created with.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // === Node registry ===

    /// Add a peer with an empty holding set.
    ///
    /// Adding a known peer again replaces its record, forgetting everything
    /// it was marked as holding.
    pub fn add_node(&self, contact: Contact, public_key: VerifyingKey) {
        if contact.id == self.id {
            warn!(id = ?contact.id, "Ignoring attempt to add the local node to the world model");
            return;
        }

        let id = contact.id;
        let address = contact.address;

        let previous = self
            .write()
            .nodes
            .add(NodeRecord::new(contact, public_key));

        debug!(?id, ?address, replaced = previous.is_some(), "Added node");
    }

    /// Returns a snapshot of the record of a known peer.
    pub fn node_record(&self, id: &Id) -> Option<NodeRecord> {
        self.read().nodes.get(id).cloned()
    }

    /// Mark `id` as holding `hash`.
    pub fn set_node_holding(&self, id: &Id, hash: Id) -> Result<()> {
        self.write().nodes.mark_holding(id, hash)?;

        trace!(?id, ?hash, "Node holding");

        Ok(())
    }

    pub fn is_holding(&self, id: &Id, hash: &Id) -> Result<bool> {
        self.read().nodes.is_holding(id, hash)
    }

    /// Returns every hash `id` is marked as holding.
    pub fn holding(&self, id: &Id) -> Result<Vec<Id>> {
        self.read()
            .nodes
            .get(id)
            .map(|record| record.holding().iter().copied().collect())
            .ok_or(Error::NodeNotFound(*id))
    }

    /// Returns every known peer believed to hold `hash`.
    pub fn holders(&self, hash: &Id) -> Vec<Id> {
        self.read().nodes.holders(hash)
    }

    /// Returns the Ids of every known peer, excluding the local node.
    pub fn all_nodes(&self) -> Vec<Id> {
        self.read().nodes.ids()
    }

    /// Returns the number of known peers, excluding the local node.
    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Eviction ===

    /// Remove a peer and drop it from every responsibility entry.
    ///
    /// Entries are not recomputed, call [Self::update_responsible] for that.
    pub fn remove_node(&self, id: &Id) -> Option<NodeRecord> {
        let mut state = self.write();

        let removed = state.nodes.remove(id)?;
        state.responsible.remove_peer(id);

        debug!(?id, "Removed node");

        Some(removed)
    }

    /// Unmark `id` as holding `hash`, returning whether it was marked.
    pub fn forget_holding(&self, id: &Id, hash: &Id) -> Result<bool> {
        self.write().nodes.forget_holding(id, hash)
    }

    /// Drop the responsibility entry for `hash`, returning whether there was one.
    pub fn forget_responsible(&self, hash: &Id) -> bool {
        self.write().responsible.remove(hash)
    }

    // === Responsibility ===

    /// Returns every hash the local node currently believes itself responsible for.
    pub fn responsible(&self) -> Vec<Id> {
        self.read().responsible.hashes()
    }

    pub fn is_responsible(&self, hash: &Id) -> bool {
        self.read().responsible.contains(hash)
    }

    /// Returns the other peers sharing responsibility for `hash`.
    ///
    /// With redundancy disabled every known peer overlaps. Otherwise this is
    /// the entry stored by the last [Self::update_responsible], empty if the
    /// local node is not responsible.
    pub fn overlap(&self, hash: &Id, redundancy_enabled: bool) -> Vec<Id> {
        self.read().overlap(hash, redundancy_enabled)
    }

    /// Like [Self::overlap], minus the peers already known to hold `hash`.
    pub fn overlap_not_holding(&self, hash: &Id, redundancy_enabled: bool) -> Vec<Id> {
        let state = self.read();

        state
            .overlap(hash, redundancy_enabled)
            .into_iter()
            .filter(|id| !matches!(state.nodes.is_holding(id, hash), Ok(true)))
            .collect()
    }

    // === Private Methods ===

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, D: DistanceOrder> World<S, D> {
    /// Recompute whether the local node is responsible for `hash`, and with
    /// which peers, returning `true` if it is.
    ///
    /// A `redundancy` of `0` makes every node responsible for every hash.
    /// Otherwise the local node is responsible if it is among the
    /// `redundancy` closest of all known peers plus itself.
    ///
    /// # Panics
    ///
    /// A `redundancy` of `1` is not supported and panics. Use
    /// [Config::validate](crate::Config::validate) to reject it up front.
    pub fn update_responsible(&self, hash: Id, redundancy: usize) -> Result<bool> {
        if redundancy == 1 {
            error!(?hash, "Redundancy factor of 1 is not supported");
            panic!("{}", Error::UnsupportedRedundancy(redundancy));
        }

        let mut state = self.write();

        if redundancy == 0 {
            state.responsible.insert(hash, Vec::new());

            trace!(?hash, redundancy, "Responsible, partitioning disabled");

            return Ok(true);
        }

        let mut candidates = state.nodes.ids();
        candidates.push(self.id);

        let ordered = self
            .distance
            .sort_closest(&hash, candidates)
            .map_err(|error| Error::Distance(Box::new(error)))?;

        match close_set_overlap(&self.id, ordered, redundancy) {
            Some(overlap) => {
                trace!(?hash, redundancy, ?overlap, "Responsible");

                state.responsible.insert(hash, overlap);

                Ok(true)
            }
            None => {
                let removed = state.responsible.remove(&hash);

                trace!(?hash, redundancy, removed, "Not responsible");

                Ok(false)
            }
        }
    }
}

//! Holding maintenance logic.
//!
//! Decides what an external replication driver should do, it never talks
//! to the network itself.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::common::Id;
use crate::distance::DistanceOrder;
use crate::{Config, Result, World};

/// Peers that should be asked to hold a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldRequest {
    pub hash: Id,
    /// Overlapping peers not yet known to hold `hash`.
    pub peers: Vec<Id>,
}

/// Decisions about which items to hold and replicate
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HoldingDecisions {
    /// Hashes the local node is responsible for.
    pub responsible: Vec<Id>,

    /// Hashes the local node is no longer responsible for, and may drop.
    pub released: Vec<Id>,

    /// Replication requests for responsible hashes with missing holders.
    pub hold_requests: Vec<HoldRequest>,
}

/// Holding maintenance state
#[derive(Debug)]
pub struct HoldingMaintenance {
    redundancy_factor: usize,
    interval: Duration,
    last_run: Option<Instant>,
}

impl HoldingMaintenance {
    /// Create new holding maintenance tracker, rejecting invalid configurations.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(HoldingMaintenance {
            redundancy_factor: config.redundancy_factor,
            interval: config.holding_interval,
            last_run: None,
        })
    }

    /// Returns `true` if the interval has elapsed since the last run, or it never ran.
    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    /// Recompute responsibility for `hashes` if the interval has elapsed.
    ///
    /// Returns `None` if it is not due yet.
    pub fn periodic_decisions<S, D, I>(
        &mut self,
        world: &World<S, D>,
        hashes: I,
    ) -> Result<Option<HoldingDecisions>>
    where
        D: DistanceOrder,
        I: IntoIterator<Item = Id>,
    {
        self.periodic_decisions_at(Instant::now(), world, hashes)
    }

    /// Recompute responsibility for every hash in `hashes`, usually every hash
    /// in the local hash table, and collect what to hold and replicate.
    pub fn decisions<S, D, I>(&self, world: &World<S, D>, hashes: I) -> Result<HoldingDecisions>
    where
        D: DistanceOrder,
        I: IntoIterator<Item = Id>,
    {
        let redundancy_enabled = self.redundancy_factor != 0;
        let mut decisions = HoldingDecisions::default();

        for hash in hashes {
            if !world.update_responsible(hash, self.redundancy_factor)? {
                decisions.released.push(hash);
                continue;
            }

            decisions.responsible.push(hash);

            let peers = world.overlap_not_holding(&hash, redundancy_enabled);

            if !peers.is_empty() {
                decisions.hold_requests.push(HoldRequest { hash, peers });
            }
        }

        debug!(
            responsible = decisions.responsible.len(),
            released = decisions.released.len(),
            hold_requests = decisions.hold_requests.len(),
            "Holding maintenance"
        );

        Ok(decisions)
    }

    // === Private Methods ===

    fn is_due_at(&self, now: Instant) -> bool {
        match self.last_run {
            Some(last_run) => now.duration_since(last_run) >= self.interval,
            None => true,
        }
    }

    fn periodic_decisions_at<S, D, I>(
        &mut self,
        now: Instant,
        world: &World<S, D>,
        hashes: I,
    ) -> Result<Option<HoldingDecisions>>
    where
        D: DistanceOrder,
        I: IntoIterator<Item = Id>,
    {
        if !self.is_due_at(now) {
            return Ok(None);
        }

        let decisions = self.decisions(world, hashes)?;
        self.last_run = Some(now);

        Ok(Some(decisions))
    }
}

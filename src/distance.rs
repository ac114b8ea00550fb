//! Ordering of peers by proximity to a content hash.

use std::convert::Infallible;

use crate::common::Id;

/// Orders a list of peers by their proximity to a target hash, closest first.
///
/// The world model derives responsibility from this order, so implementations
/// must be total and deterministic: the same `target` and the same set of
/// `peers` always yield the same order, regardless of the input order.
pub trait DistanceOrder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn sort_closest(&self, target: &Id, peers: Vec<Id>) -> Result<Vec<Id>, Self::Error>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Kademlia XOR metric.
///
/// XOR against a fixed target is a bijection, so distinct ids never tie.
pub struct XorDistance;

impl DistanceOrder for XorDistance {
    type Error = Infallible;

    fn sort_closest(&self, target: &Id, mut peers: Vec<Id>) -> Result<Vec<Id>, Self::Error> {
        peers.sort_by_cached_key(|id| id.xor(target));

        Ok(peers)
    }
}

//! Network reachability record of a peer
use std::net::SocketAddr;

use crate::common::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
/// How to reach a peer. Passed through the world model unexamined.
pub struct Contact {
    pub id: Id,
    pub address: SocketAddr,
}

impl Contact {
    /// Creates a new Contact from an id and socket address.
    pub fn new(id: Id, address: SocketAddr) -> Contact {
        Contact { id, address }
    }

    #[cfg(test)]
    pub fn random() -> Contact {
        Contact {
            id: Id::random(),
            address: SocketAddr::from(([127, 0, 0, 1], 0)),
        }
    }
}

//! End to end behavior of the world model with a scripted distance ordering.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;

use dht_world::{Contact, DistanceOrder, Error, Id, SigningKey, World};
use rayon::prelude::*;

/// Orders peers by their position in a ranking set by the test, unranked
/// peers last by id.
#[derive(Debug, Clone, Default)]
struct ScriptedDistance {
    ranking: Arc<Mutex<Vec<Id>>>,
}

impl ScriptedDistance {
    fn set(&self, ranking: Vec<Id>) {
        *self.ranking.lock().unwrap() = ranking;
    }
}

impl DistanceOrder for ScriptedDistance {
    type Error = std::convert::Infallible;

    fn sort_closest(&self, _target: &Id, mut peers: Vec<Id>) -> Result<Vec<Id>, Self::Error> {
        let ranking = self.ranking.lock().unwrap();

        peers.sort_by_key(|id| {
            (
                ranking.iter().position(|ranked| ranked == id).unwrap_or(usize::MAX),
                *id,
            )
        });

        Ok(peers)
    }
}

#[derive(Debug)]
struct Unreachable;

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "distance oracle unreachable")
    }
}

impl std::error::Error for Unreachable {}

struct FailingDistance;

impl DistanceOrder for FailingDistance {
    type Error = Unreachable;

    fn sort_closest(&self, _target: &Id, _peers: Vec<Id>) -> Result<Vec<Id>, Self::Error> {
        Err(Unreachable)
    }
}

fn add<S, D>(world: &World<S, D>) -> Id {
    let id = Id::random();
    let address = SocketAddr::from(([10, 0, 0, 1], 6881));
    let key = SigningKey::from_bytes(&rand::random::<[u8; 32]>()).verifying_key();

    world.add_node(Contact::new(id, address), key);

    id
}

fn set(ids: Vec<Id>) -> HashSet<Id> {
    ids.into_iter().collect()
}

#[test]
fn responsibility_follows_membership() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let me = Id::random();
    let distance = ScriptedDistance::default();
    let world = World::new(me, ()).with_distance(distance.clone());

    let hash = Id::random();

    let a = add(&world);
    let b = add(&world);
    let c = add(&world);

    distance.set(vec![me, a, b, c]);

    assert!(world.update_responsible(hash, 3).unwrap());
    assert_eq!(set(world.overlap(&hash, true)), set(vec![a, b]));
    assert_eq!(world.responsible(), vec![hash]);

    let d = add(&world);
    distance.set(vec![d, me, a, b, c]);

    assert!(world.update_responsible(hash, 3).unwrap());
    assert_eq!(set(world.overlap(&hash, true)), set(vec![d, a]));

    let e = add(&world);
    let f = add(&world);
    distance.set(vec![d, e, f, me, a, b, c]);

    assert!(!world.update_responsible(hash, 3).unwrap());
    assert!(world.overlap(&hash, true).is_empty());
    assert!(world.responsible().is_empty());
    assert!(!world.is_responsible(&hash));
}

#[test]
fn overlap_is_at_most_redundancy_minus_one() {
    let me = Id::random();
    let distance = ScriptedDistance::default();
    let world = World::new(me, ()).with_distance(distance.clone());

    let mut peers: Vec<Id> = (0..10).map(|_| add(&world)).collect();
    let hash = Id::random();

    peers.insert(2, me);
    distance.set(peers.clone());

    for redundancy in 3..8 {
        assert!(world.update_responsible(hash, redundancy).unwrap());

        let overlap = world.overlap(&hash, true);
        let expected: Vec<Id> = peers[..redundancy]
            .iter()
            .filter(|id| **id != me)
            .copied()
            .collect();

        assert_eq!(overlap, expected);
        assert_eq!(overlap.len(), redundancy - 1);
    }

    assert!(!world.update_responsible(hash, 2).unwrap());
}

#[test]
fn redundancy_disabled_ignores_distance() {
    let world = World::new(Id::random(), ()).with_distance(FailingDistance);

    let peers = vec![add(&world), add(&world), add(&world)];

    for _ in 0..10 {
        let hash = Id::random();

        assert!(world.update_responsible(hash, 0).unwrap());
        assert_eq!(set(world.overlap(&hash, false)), set(world.all_nodes()));
    }

    assert_eq!(set(world.all_nodes()), set(peers));
    assert_eq!(world.responsible().len(), 10);
}

#[test]
fn distance_errors_are_propagated() {
    let world = World::new(Id::random(), ()).with_distance(FailingDistance);
    add(&world);

    let hash = Id::random();

    match world.update_responsible(hash, 3) {
        Err(Error::Distance(error)) => {
            assert_eq!(error.to_string(), "distance oracle unreachable")
        }
        other => panic!("expected a distance error, got {:?}", other),
    }

    assert!(world.responsible().is_empty());
}

#[test]
fn unknown_peers() {
    let world = World::new(Id::random(), ());
    let stranger = Id::random();
    let hash = Id::random();

    assert!(matches!(
        world.set_node_holding(&stranger, hash),
        Err(Error::NodeNotFound(id)) if id == stranger
    ));
    assert!(matches!(
        world.is_holding(&stranger, &hash),
        Err(Error::NodeNotFound(id)) if id == stranger
    ));

    // Unknown peer: add it, then retry.
    world.add_node(
        Contact::new(stranger, SocketAddr::from(([10, 0, 0, 2], 6881))),
        SigningKey::from_bytes(&[1; 32]).verifying_key(),
    );

    world.set_node_holding(&stranger, hash).unwrap();
    assert!(world.is_holding(&stranger, &hash).unwrap());
}

#[test]
fn concurrent_readers() {
    let world = World::new(Id::random(), ());
    let hashes: Vec<Id> = (0..20).map(|_| Id::random()).collect();

    for _ in 0..50 {
        let id = add(&world);
        for hash in &hashes {
            world.set_node_holding(&id, *hash).unwrap();
        }
    }

    for hash in &hashes {
        world.update_responsible(*hash, 0).unwrap();
    }

    (0..1000).into_par_iter().for_each(|i| {
        let nodes = world.all_nodes();
        assert_eq!(nodes.len(), 50);

        let record = world.node_record(&nodes[i % nodes.len()]).unwrap();
        assert_eq!(record.holding().len(), hashes.len());

        assert_eq!(world.responsible().len(), hashes.len());
    });
}

#[test]
fn readers_while_writing() {
    const REDUNDANCY: usize = 4;

    let world = Arc::new(World::new(Id::random(), ()));
    let hashes: Vec<Id> = (0..10).map(|_| Id::random()).collect();

    let writer = {
        let world = world.clone();
        let hashes = hashes.clone();

        thread::spawn(move || {
            for _ in 0..200 {
                add(&*world);

                for hash in &hashes {
                    world.update_responsible(*hash, REDUNDANCY).unwrap();
                }
            }
        })
    };

    (0..2000).into_par_iter().for_each(|i| {
        let hash = hashes[i % hashes.len()];

        let overlap = world.overlap(&hash, true);
        assert!(overlap.len() < REDUNDANCY);

        // Peers are never removed here, so a later snapshot contains them all.
        let nodes = set(world.all_nodes());
        assert!(overlap.iter().all(|id| nodes.contains(id)));
    });

    writer.join().unwrap();

    assert_eq!(world.len(), 200);
}

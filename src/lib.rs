#![doc = include_str!("../README.md")]

mod common;
mod config;
mod distance;
mod error;
mod maintenance;
mod world;

pub use crate::common::{Contact, Id, ID_SIZE, MAX_DISTANCE};
pub use config::{Config, DEFAULT_HOLDING_INTERVAL, DEFAULT_REDUNDANCY_FACTOR};
pub use distance::{DistanceOrder, XorDistance};
pub use error::{Error, Result};
pub use maintenance::{HoldRequest, HoldingDecisions, HoldingMaintenance};
pub use world::{NodeRecord, World};

pub use ed25519_dalek::{SigningKey, VerifyingKey};

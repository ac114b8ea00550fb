//! Main Crate Error

use crate::common::Id;

#[derive(thiserror::Error, Debug)]
/// World model error enum.
pub enum Error {
    /// The peer was never added to the world model (or was removed).
    #[error("Node not found: {0}")]
    NodeNotFound(Id),

    /// A redundancy factor of exactly one is not a supported configuration.
    ///
    /// Returned by [Config::validate](crate::Config::validate). Reaching
    /// [World::update_responsible](crate::World::update_responsible) with
    /// this factor panics instead.
    #[error("Unsupported redundancy factor: {0}")]
    UnsupportedRedundancy(usize),

    /// Bytes of the wrong length were passed to [Id::from_bytes].
    #[error("Invalid Id size, expected 20, got {0}")]
    InvalidIdSize(usize),

    /// A string that is not 40 hex characters was parsed as an [Id].
    #[error("Invalid Id encoding: {0}")]
    InvalidIdEncoding(String),

    #[error(transparent)]
    /// Transparent error from the [DistanceOrder](crate::DistanceOrder) capability.
    Distance(Box<dyn std::error::Error + Send + Sync>),
}

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

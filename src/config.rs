use std::time::Duration;

use crate::{Error, Result};

/// Redundancy factor used when none is configured: partitioning disabled,
/// every node holds every item.
pub const DEFAULT_REDUNDANCY_FACTOR: usize = 0;

/// How often the holding maintenance recomputes responsibility.
pub const DEFAULT_HOLDING_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
/// World model configurations
pub struct Config {
    /// Number of peers that should jointly hold each item.
    ///
    /// `0` disables responsibility partitioning. `1` is not supported.
    ///
    /// Defaults to [DEFAULT_REDUNDANCY_FACTOR]
    pub redundancy_factor: usize,
    /// Minimum time between two runs of [HoldingMaintenance](crate::HoldingMaintenance).
    ///
    /// Defaults to [DEFAULT_HOLDING_INTERVAL]
    pub holding_interval: Duration,
}

impl Config {
    /// Reject configurations the world model cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.redundancy_factor == 1 {
            return Err(Error::UnsupportedRedundancy(self.redundancy_factor));
        }

        Ok(())
    }

    /// Returns `false` if every node is responsible for every item.
    pub fn redundancy_enabled(&self) -> bool {
        self.redundancy_factor != 0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redundancy_factor: DEFAULT_REDUNDANCY_FACTOR,
            holding_interval: DEFAULT_HOLDING_INTERVAL,
        }
    }
}

//! # Worker Configuration
//!
//! Everything is read from the environment once, at startup. Unset or
//! unparsable values fall back to defaults.

use courier_bus::DEFAULT_CHANNEL_CAPACITY;
use courier_correlator::CorrelatorConfig;
use std::env;
use tracing::warn;

/// Environment variable holding the bus buffer size.
pub const BUS_CAPACITY_ENV_VAR: &str = "COURIER_BUS_CAPACITY";

/// Complete worker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Events buffered per bus subscriber before it lags.
    pub bus_capacity: usize,
    /// Settings for the in-process correlator.
    pub correlator: CorrelatorConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            correlator: CorrelatorConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let bus_capacity = env::var(BUS_CAPACITY_ENV_VAR)
            .ok()
            .map_or(DEFAULT_CHANNEL_CAPACITY, |raw| parse_capacity(&raw));

        Self {
            bus_capacity,
            correlator: CorrelatorConfig::from_env(),
        }
    }
}

fn parse_capacity(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(capacity) if capacity > 0 => capacity,
        _ => {
            warn!(
                var = BUS_CAPACITY_ENV_VAR,
                value = raw,
                default = DEFAULT_CHANNEL_CAPACITY,
                "Ignoring invalid bus capacity"
            );
            DEFAULT_CHANNEL_CAPACITY
        }
    }
}

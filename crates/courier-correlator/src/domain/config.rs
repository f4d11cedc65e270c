//! Correlator configuration with validation.

use std::env;
use std::time::Duration;
use tracing::warn;

use crate::domain::error::ConfigError;

/// Default wait before a call resolves with a timeout payload.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the call timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "COURIER_TIMEOUT_SECS";

/// Correlator configuration. Read once, applied to every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatorConfig {
    /// Deadline for each call, measured from registration of its id.
    pub timeout: Duration,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TIMEOUT_SECS)
    }
}

impl CorrelatorConfig {
    /// Configuration with a timeout of `secs` seconds.
    pub fn from_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }

    /// Configuration with an arbitrary timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Create configuration from `COURIER_TIMEOUT_SECS`.
    ///
    /// Missing, unparsable or zero values fall back to the default.
    pub fn from_env() -> Self {
        match env::var(TIMEOUT_ENV_VAR) {
            Ok(raw) => Self::from_env_value(&raw),
            Err(_) => Self::default(),
        }
    }

    fn from_env_value(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Self::from_secs(secs),
            _ => {
                warn!(
                    var = TIMEOUT_ENV_VAR,
                    value = raw,
                    default_secs = DEFAULT_TIMEOUT_SECS,
                    "Ignoring invalid timeout, using default"
                );
                Self::default()
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("timeout cannot be 0".into()));
        }
        Ok(())
    }
}

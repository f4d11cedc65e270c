//! Correlator error types.
//!
//! Remote failures, timeouts and cancellations are not errors here: they
//! come back as error-shaped [`ResponsePayload`](courier_bus::ResponsePayload)
//! values. Only failures of the machinery itself surface as `Err`.

use crate::domain::correlation::RequestId;
use crate::ports::outbound::TransportError;

/// Failures of the correlation table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The id is already pending or holds an unconsumed result.
    #[error("correlation id {0} is already registered")]
    DuplicateId(RequestId),

    /// Nothing is stored for the id (never completed, or already taken).
    #[error("no result stored for correlation id {0}")]
    NotFound(RequestId),
}

/// Failures of a call.
#[derive(Debug, thiserror::Error)]
pub enum CorrelatorError {
    /// The transport refused the outbound envelope.
    #[error("failed to publish request {correlation_id}")]
    Transport {
        /// Id of the call whose request was not published.
        correlation_id: RequestId,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// Correlation table failure.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Invalid correlator configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Timeout must be non-zero.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

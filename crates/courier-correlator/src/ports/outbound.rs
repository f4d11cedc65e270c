//! Outbound ports for the correlator.

use async_trait::async_trait;
use courier_bus::OutboundEnvelope;

/// Transport error types
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport has been shut down.
    #[error("transport closed")]
    Closed,

    /// Nobody is listening for requests, so the call could never be answered.
    #[error("no subscribers for topic {0}")]
    NoSubscribers(String),

    /// Any other publish failure reported by the transport.
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// One-way publication of outbound envelopes.
///
/// Replies do not come back through this trait; they arrive out of band at
/// the [`ResponseSink`](crate::ipc::ResponseSink).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish a request envelope.
    async fn publish(&self, envelope: OutboundEnvelope) -> Result<(), TransportError>;
}

//! Event bus adapter.
//!
//! Implements [`Transport`] on top of `courier-bus`, so that a correlator
//! and a worker in the same process can talk through the in-memory bus.

use crate::domain::CorrelationTable;
use crate::ipc::listener::ResponseListener;
use crate::ipc::sink::ResponseSink;
use crate::ports::outbound::{Transport, TransportError};
use async_trait::async_trait;
use courier_bus::{
    BusError, BusEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus,
    OutboundEnvelope,
};
use std::sync::Arc;
use tracing::debug;

/// Publishes outbound envelopes as [`BusEvent::Request`] events.
pub struct BusTransport {
    bus: Arc<InMemoryEventBus>,
}

impl BusTransport {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    /// Build a listener that feeds the bus response topic into `table`.
    ///
    /// The subscription is taken here, so responses published after this
    /// call are buffered even before the listener task is spawned.
    pub fn response_listener(&self, table: Arc<CorrelationTable>) -> ResponseListener {
        let subscription = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Responses]));
        ResponseListener::new(ResponseSink::new(table), subscription)
    }
}

#[async_trait]
impl Transport for BusTransport {
    async fn publish(&self, envelope: OutboundEnvelope) -> Result<(), TransportError> {
        if self.bus.is_closed() {
            return Err(TransportError::Closed);
        }
        if self.bus.subscribers_for(EventTopic::Requests) == 0 {
            return Err(TransportError::NoSubscribers(format!(
                "{:?}",
                EventTopic::Requests
            )));
        }

        let correlation_id = envelope.id.clone();
        let method = envelope.method.clone();
        let receivers = self
            .bus
            .publish(BusEvent::Request(envelope))
            .await
            .map_err(|e| match e {
                BusError::Closed => TransportError::Closed,
            })?;

        debug!(
            correlation_id = %correlation_id,
            method = %method,
            receivers,
            "Request published to event bus"
        );
        Ok(())
    }
}

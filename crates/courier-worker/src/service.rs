//! # Worker Service
//!
//! Subscribes to the request topic, dispatches every envelope on its own
//! task and publishes the reply on the response topic.

use crate::dispatch::Dispatcher;
use courier_bus::{
    BusEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus, InboundEnvelope,
    OutboundEnvelope, Subscription,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Bus loop answering correlated requests.
pub struct WorkerService {
    dispatcher: Arc<Dispatcher>,
    bus: Arc<InMemoryEventBus>,
    subscription: Subscription,
    shutdown: watch::Receiver<bool>,
}

impl WorkerService {
    /// Create a worker and subscribe it to the request topic.
    ///
    /// Requests published after this call are buffered until `run` starts.
    pub fn new(
        bus: Arc<InMemoryEventBus>,
        dispatcher: Arc<Dispatcher>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Requests]));
        Self {
            dispatcher,
            bus,
            subscription,
            shutdown,
        }
    }

    /// Process requests until shutdown is signalled or the bus closes.
    ///
    /// Returns the number of requests accepted.
    #[instrument(skip(self), name = "worker_service")]
    pub async fn run(mut self) -> u64 {
        info!(methods = self.dispatcher.len(), "Worker started listening for requests");
        let mut accepted = 0u64;

        loop {
            let event = tokio::select! {
                event = self.subscription.recv() => event,
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                    continue;
                }
            };

            match event {
                Some(BusEvent::Request(envelope)) => {
                    accepted += 1;
                    debug!(
                        correlation_id = %envelope.id,
                        method = %envelope.method,
                        "Received request"
                    );
                    tokio::spawn(respond(
                        Arc::clone(&self.dispatcher),
                        Arc::clone(&self.bus),
                        envelope,
                    ));
                }
                Some(other) => {
                    warn!("Received unexpected event type: {:?}", other.topic());
                }
                None => {
                    error!("Event bus closed, worker shutting down");
                    break;
                }
            }
        }

        accepted
    }
}

async fn respond(
    dispatcher: Arc<Dispatcher>,
    bus: Arc<InMemoryEventBus>,
    envelope: OutboundEnvelope,
) {
    let payload = dispatcher.dispatch(&envelope).await;
    let reply = InboundEnvelope::new(envelope.id, payload);
    let correlation_id = reply.id.clone();

    match bus.publish(BusEvent::Response(reply)).await {
        Ok(receivers) => debug!(
            correlation_id = %correlation_id,
            receivers,
            "Published response"
        ),
        Err(e) => warn!(
            correlation_id = %correlation_id,
            error = %e,
            "Failed to publish response"
        ),
    }
}

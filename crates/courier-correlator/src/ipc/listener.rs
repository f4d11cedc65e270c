//! Response listener: drains the bus response topic into the sink.

use crate::ipc::sink::ResponseSink;
use courier_bus::{BusEvent, Subscription};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Task body that feeds inbound envelopes to a [`ResponseSink`].
pub struct ResponseListener {
    sink: ResponseSink,
    subscription: Subscription,
    shutdown: Option<watch::Receiver<bool>>,
}

impl ResponseListener {
    pub fn new(sink: ResponseSink, subscription: Subscription) -> Self {
        Self {
            sink,
            subscription,
            shutdown: None,
        }
    }

    /// Stop when `shutdown` flips to `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run the listener loop until the bus closes or shutdown is signalled.
    ///
    /// Returns the number of envelopes that matched a pending call.
    pub async fn run(mut self) -> u64 {
        let mut matched = 0u64;
        info!("Response listener started");

        loop {
            let event = match self.shutdown.as_mut() {
                Some(shutdown) => tokio::select! {
                    event = self.subscription.recv() => event,
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Response listener shutting down");
                            break;
                        }
                        continue;
                    }
                },
                None => self.subscription.recv().await,
            };

            match event {
                Some(BusEvent::Response(envelope)) => {
                    if self.sink.on_message(envelope) {
                        matched += 1;
                    }
                }
                Some(other) => {
                    debug!(topic = ?other.topic(), "Ignoring non-response event");
                }
                None => {
                    warn!("Event bus closed, stopping response listener");
                    break;
                }
            }
        }

        matched
    }
}

//! # Integration Tests
//!
//! [`Harness`] wires the full stack onto one bus so each test only has to
//! choose the dispatcher and the timeout.

pub mod end_to_end;
pub mod fault_injection;

use courier_bus::InMemoryEventBus;
use courier_correlator::{BusTransport, Correlator, CorrelatorConfig};
use courier_worker::{Dispatcher, WorkerService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Correlator, worker and response listener on a shared bus.
pub struct Harness {
    pub bus: Arc<InMemoryEventBus>,
    pub correlator: Correlator,
    shutdown: watch::Sender<bool>,
    worker: JoinHandle<u64>,
    listener: JoinHandle<u64>,
}

impl Harness {
    /// Start every component. Must be called inside a tokio runtime.
    pub fn start(dispatcher: Dispatcher, timeout: Duration) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let worker =
            WorkerService::new(Arc::clone(&bus), Arc::new(dispatcher), shutdown_rx.clone());
        let worker = tokio::spawn(worker.run());

        let transport = Arc::new(BusTransport::new(Arc::clone(&bus)));
        let correlator = Correlator::new(
            &CorrelatorConfig::with_timeout(timeout),
            transport.clone(),
        )
        .expect("valid correlator config");
        let listener = transport
            .response_listener(Arc::clone(correlator.table()))
            .with_shutdown(shutdown_rx);
        let listener = tokio::spawn(listener.run());

        Self {
            bus,
            correlator,
            shutdown,
            worker,
            listener,
        }
    }

    /// Stop the background tasks.
    ///
    /// Returns `(requests accepted by the worker, responses matched)`.
    pub async fn stop(self) -> (u64, u64) {
        let _ = self.shutdown.send(true);
        let accepted = self.worker.await.expect("worker task");
        let matched = self.listener.await.expect("listener task");
        (accepted, matched)
    }
}

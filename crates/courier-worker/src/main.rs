//! # Courier Worker
//!
//! Runs a worker and a correlator on one in-memory bus and performs a
//! `gettestdata` round trip.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load configuration from the environment
//! 3. Create the event bus
//! 4. Start the worker and the response listener
//! 5. Issue the call and log the outcome
//! 6. Signal shutdown

use std::sync::Arc;

use anyhow::{Context, Result};
use courier_bus::{InMemoryEventBus, Params};
use courier_correlator::{BusTransport, Correlator};
use courier_telemetry::{init_telemetry, TelemetryConfig};
use courier_worker::{default_dispatcher, WorkerConfig, WorkerService};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_service("courier-worker"))
        .context("failed to initialize telemetry")?;

    let config = WorkerConfig::from_env();
    info!(
        bus_capacity = config.bus_capacity,
        timeout_secs = config.correlator.timeout.as_secs_f64(),
        "Starting courier worker"
    );

    let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = WorkerService::new(
        Arc::clone(&bus),
        Arc::new(default_dispatcher()),
        shutdown_rx.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let transport = Arc::new(BusTransport::new(Arc::clone(&bus)));
    let correlator = Correlator::new(&config.correlator, transport.clone())
        .context("invalid correlator configuration")?;
    let listener = transport
        .response_listener(Arc::clone(correlator.table()))
        .with_shutdown(shutdown_rx);
    let listener_handle = tokio::spawn(listener.run());

    let payload = correlator
        .call("GetTestData", Params::new())
        .await
        .context("gettestdata call failed")?;

    match payload.into_result() {
        Ok(result) => info!(%result, "Round trip completed"),
        Err(e) => warn!(code = e.code, message = %e.message, "Round trip returned an error"),
    }

    if let Err(e) = shutdown_tx.send(true) {
        error!("Failed to send shutdown signal: {}", e);
    }
    let handled = worker_handle.await.context("worker task panicked")?;
    let matched = listener_handle.await.context("listener task panicked")?;
    info!(handled, matched, "Shutdown complete");

    Ok(())
}

//! Correlator service - the call façade.
//!
//! `call` = initiate → publish → wait → fetch-and-clear. The id is
//! registered before the envelope is handed to the transport, so a reply
//! that overtakes `publish` is not lost.

use crate::domain::{
    Completion, CorrelationTable, CorrelatorConfig, CorrelatorError, RequestId, TableError,
};
use crate::ipc::{RequestInitiator, ResponseSink, WaitState, Waiter};
use crate::ports::outbound::Transport;
use courier_bus::{OutboundEnvelope, Params, ResponsePayload, RpcError};
use courier_telemetry::{
    call_span, CALLS_IN_FLIGHT, CALLS_ISSUED, CALL_DURATION, PUBLISH_FAILURES,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Synchronous-looking calls over a one-way transport.
pub struct Correlator {
    table: Arc<CorrelationTable>,
    initiator: RequestInitiator,
    waiter: Waiter,
    transport: Arc<dyn Transport>,
}

impl Correlator {
    /// Create a correlator with its own correlation table.
    pub fn new(
        config: &CorrelatorConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CorrelatorError> {
        Self::with_table(config, transport, Arc::new(CorrelationTable::new()))
    }

    /// Create a correlator over an existing table.
    pub fn with_table(
        config: &CorrelatorConfig,
        transport: Arc<dyn Transport>,
        table: Arc<CorrelationTable>,
    ) -> Result<Self, CorrelatorError> {
        config.validate()?;

        info!(timeout_secs = config.timeout.as_secs_f64(), "Correlator created");
        Ok(Self {
            initiator: RequestInitiator::new(Arc::clone(&table)),
            waiter: Waiter::new(Arc::clone(&table), config.timeout),
            table,
            transport,
        })
    }

    /// The shared correlation table.
    pub fn table(&self) -> &Arc<CorrelationTable> {
        &self.table
    }

    /// A sink to hand to whatever delivers inbound envelopes.
    pub fn sink(&self) -> ResponseSink {
        ResponseSink::new(Arc::clone(&self.table))
    }

    /// Deadline applied to every call.
    pub fn timeout(&self) -> Duration {
        self.waiter.timeout()
    }

    /// Publish `method` and wait for its terminal payload.
    ///
    /// Remote errors, timeouts and cancellations come back as
    /// [`ResponsePayload::Error`]. `Err` means the request never left.
    pub async fn call(
        &self,
        method: &str,
        params: Params,
    ) -> Result<ResponsePayload, CorrelatorError> {
        self.start(method, params).await?.wait().await
    }

    /// Register and publish a call without waiting for it.
    ///
    /// Dropping the returned [`PendingCall`] before waiting on it abandons
    /// the call and clears its table entry.
    pub async fn start(
        &self,
        method: &str,
        params: Params,
    ) -> Result<PendingCall, CorrelatorError> {
        let method = method.to_lowercase();
        let (id, completion) = self.initiator.begin()?;
        let started = Instant::now();

        CALLS_ISSUED.inc();
        CALLS_IN_FLIGHT.inc();
        let call = PendingCall {
            id,
            method: method.clone(),
            completion: Some(completion),
            waiter: self.waiter.clone(),
            table: Arc::clone(&self.table),
            started,
            deadline: started + self.waiter.timeout(),
            settled: false,
        };

        let envelope = OutboundEnvelope::new(method.as_str(), params, id.to_string());
        if let Err(source) = self.transport.publish(envelope).await {
            PUBLISH_FAILURES.inc();
            warn!(correlation_id = %id, method = %method, error = %source, "Publish failed");
            return Err(CorrelatorError::Transport {
                correlation_id: id,
                source,
            });
        }

        debug!(correlation_id = %id, method = %method, "Request published");
        Ok(call)
    }

    /// Resolve a pending call with a cancellation payload.
    ///
    /// Returns `false` if the call already has a terminal payload.
    pub fn cancel(&self, id: &RequestId) -> bool {
        let cancelled = self.table.complete(*id, RpcError::cancelled().into());
        if cancelled {
            info!(correlation_id = %id, "Call cancelled");
        }
        cancelled
    }
}

/// A published call that has not been waited on yet.
pub struct PendingCall {
    id: RequestId,
    method: String,
    completion: Option<Completion>,
    waiter: Waiter,
    table: Arc<CorrelationTable>,
    started: Instant,
    deadline: Instant,
    settled: bool,
}

impl PendingCall {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Deadline of the call, one timeout after registration.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Wait for the terminal payload.
    ///
    /// The deadline keeps running while the request is published and
    /// before `wait` is called.
    pub async fn wait(mut self) -> Result<ResponsePayload, CorrelatorError> {
        let span = call_span!(self.method, self.id);
        let completion = self
            .completion
            .take()
            .ok_or(TableError::NotFound(self.id))?;

        let result = self
            .waiter
            .wait_until(self.id, completion, self.deadline)
            .instrument(span)
            .await;
        self.settled = true;
        CALL_DURATION.observe(self.started.elapsed().as_secs_f64());

        let (payload, state) = result?;
        if state == WaitState::TimedOut {
            warn!(correlation_id = %self.id, method = %self.method, "Call timed out");
        }
        Ok(payload)
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        CALLS_IN_FLIGHT.dec();
        if !self.settled && self.table.discard(self.id) {
            debug!(correlation_id = %self.id, "Abandoned call cleared");
        }
    }
}

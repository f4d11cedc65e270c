//! Waiter: suspends one call until it is resolved or its deadline passes.
//!
//! ```text
//!             response / cancel
//!   WAITING ─────────────────────▶ RESOLVED ──┐
//!      │                                      ├──▶ take(id)
//!      └─── deadline ──▶ TIMED_OUT ───────────┘
//! ```
//!
//! On deadline the waiter completes the entry itself with the timeout
//! payload. If a response landed in the same instant, that completion is a
//! no-op and the response is what `take` returns.

use crate::domain::{Completion, CorrelationTable, RequestId, TableError};
use courier_bus::{ErrorKind, ResponsePayload, RpcError};
use courier_telemetry::{CALLS_CANCELLED, CALLS_COMPLETED, CALLS_TIMED_OUT};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Resolved by a response or by cancellation.
    Resolved,
    /// Resolved by the deadline.
    TimedOut,
}

#[derive(Clone)]
pub struct Waiter {
    table: Arc<CorrelationTable>,
    timeout: Duration,
}

impl Waiter {
    pub fn new(table: Arc<CorrelationTable>, timeout: Duration) -> Self {
        Self { table, timeout }
    }

    /// Deadline applied to every wait.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for `id` with a deadline of one timeout from now.
    pub async fn wait(
        &self,
        id: RequestId,
        completion: Completion,
    ) -> Result<(ResponsePayload, WaitState), TableError> {
        self.wait_until(id, completion, Instant::now() + self.timeout)
            .await
    }

    /// Wait for `id` until `deadline` and consume its terminal payload.
    ///
    /// A deadline already in the past resolves at once: with the stored
    /// payload if one arrived, with the timeout payload otherwise.
    /// Fails with `NotFound` only if the entry was discarded while waiting.
    pub async fn wait_until(
        &self,
        id: RequestId,
        completion: Completion,
        deadline: Instant,
    ) -> Result<(ResponsePayload, WaitState), TableError> {
        let state = match tokio::time::timeout_at(deadline, completion).await {
            Ok(true) => WaitState::Resolved,
            Ok(false) => {
                warn!(correlation_id = %id, "Pending call discarded while waiting");
                return Err(TableError::NotFound(id));
            }
            Err(_) if self.table.complete(id, RpcError::timeout().into()) => {
                debug!(
                    correlation_id = %id,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Call timed out"
                );
                WaitState::TimedOut
            }
            Err(_) => {
                debug!(correlation_id = %id, "Response won the race against the deadline");
                WaitState::Resolved
            }
        };

        let payload = self.table.take(id)?;
        record_outcome(state, &payload);
        Ok((payload, state))
    }
}

fn record_outcome(state: WaitState, payload: &ResponsePayload) {
    match state {
        WaitState::TimedOut => CALLS_TIMED_OUT.inc(),
        _ if payload.error().and_then(RpcError::kind) == Some(ErrorKind::Cancelled) => {
            CALLS_CANCELLED.inc()
        }
        _ => CALLS_COMPLETED.inc(),
    }
}

//! Correlation Table - pending ids and their terminal payloads.
//!
//! One mutex guards both the pending set and the result table, so that
//! `complete` is an indivisible test-and-set: whichever completion runs
//! first under the lock decides the payload, later ones are no-ops.
//!
//! Flow:
//! 1. Initiator calls `register()` and keeps the returned [`Completion`]
//! 2. The request is published
//! 3. Response sink (or the waiter's deadline) calls `complete()`
//! 4. The waiter is woken through its `Completion` and calls `take()`

use crate::domain::correlation::RequestId;
use crate::domain::error::TableError;
use courier_bus::ResponsePayload;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Wakes the waiter of one id exactly once, when that id is completed.
///
/// Resolves to `true` when the id was completed and `false` when the entry
/// was discarded without a payload.
#[derive(Debug)]
pub struct Completion {
    receiver: oneshot::Receiver<()>,
}

impl Future for Completion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|signal| signal.is_ok())
    }
}

/// Statistics for the correlation table
#[derive(Debug, Default)]
pub struct TableStats {
    /// Ids registered
    pub total_registered: AtomicU64,
    /// Successful completions (first writer per id)
    pub total_completed: AtomicU64,
    /// Completion attempts for ids that were not pending
    pub total_ignored: AtomicU64,
    /// Payloads handed to their consumer
    pub total_taken: AtomicU64,
    /// Entries dropped without being consumed
    pub total_discarded: AtomicU64,
}

#[derive(Default)]
struct TableState {
    /// Ids awaiting a result, with the signal that wakes their waiter.
    pending: HashMap<RequestId, oneshot::Sender<()>>,
    /// Terminal payloads not yet consumed.
    results: HashMap<RequestId, ResponsePayload>,
}

/// Concurrency-safe store mapping a request id to "pending" or
/// "completed with payload".
#[derive(Default)]
pub struct CorrelationTable {
    state: Mutex<TableState>,
    stats: TableStats,
}

impl CorrelationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to the pending set.
    ///
    /// Fails with `DuplicateId` if the id is pending or still holds an
    /// unconsumed result.
    pub fn register(&self, id: RequestId) -> Result<Completion, TableError> {
        let (sender, receiver) = oneshot::channel();

        {
            let mut state = self.state.lock();
            if state.pending.contains_key(&id) || state.results.contains_key(&id) {
                return Err(TableError::DuplicateId(id));
            }
            state.pending.insert(id, sender);
        }

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        trace!(correlation_id = %id, "Registered pending id");

        Ok(Completion { receiver })
    }

    /// Resolve `id` with `payload` if it is still pending.
    ///
    /// Returns `true` if this call decided the terminal payload, `false` if
    /// the id was unknown, already resolved, or already consumed.
    pub fn complete(&self, id: RequestId, payload: ResponsePayload) -> bool {
        let signal = {
            let mut state = self.state.lock();
            let Some(signal) = state.pending.remove(&id) else {
                self.stats.total_ignored.fetch_add(1, Ordering::Relaxed);
                trace!(correlation_id = %id, "Completion ignored, id not pending");
                return false;
            };
            state.results.insert(id, payload);
            signal
        };

        self.stats.total_completed.fetch_add(1, Ordering::Relaxed);

        // The waiter may already be gone; the result stays until discarded.
        if signal.send(()).is_err() {
            debug!(correlation_id = %id, "Completed id has no waiter");
        }
        true
    }

    /// Remove and return the payload stored for `id`.
    pub fn take(&self, id: RequestId) -> Result<ResponsePayload, TableError> {
        let payload = self
            .state
            .lock()
            .results
            .remove(&id)
            .ok_or(TableError::NotFound(id))?;

        self.stats.total_taken.fetch_add(1, Ordering::Relaxed);
        Ok(payload)
    }

    /// Drop every trace of `id` without producing a payload.
    ///
    /// Returns `true` if anything was removed.
    pub fn discard(&self, id: RequestId) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let was_pending = state.pending.remove(&id).is_some();
            let had_result = state.results.remove(&id).is_some();
            was_pending || had_result
        };

        if removed {
            self.stats.total_discarded.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "Discarded correlation entry");
        }
        removed
    }

    /// Check if `id` is still awaiting resolution
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.state.lock().pending.contains_key(id)
    }

    /// Number of ids awaiting resolution
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Number of resolved payloads not yet consumed
    pub fn completed_count(&self) -> usize {
        self.state.lock().results.len()
    }

    /// Whether the table holds no entries at all
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock();
        state.pending.is_empty() && state.results.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> &TableStats {
        &self.stats
    }
}

//! Response sink: the inbound callback of the transport.

use crate::domain::{CorrelationTable, RequestId};
use courier_bus::InboundEnvelope;
use courier_telemetry::UNMATCHED_RESPONSES;
use std::sync::Arc;
use tracing::debug;

/// Records inbound payloads against pending ids.
///
/// Anything that does not match a pending id is dropped. That is normal:
/// late replies after a timeout, duplicates, and traffic meant for another
/// process all end up here.
#[derive(Clone)]
pub struct ResponseSink {
    table: Arc<CorrelationTable>,
}

impl ResponseSink {
    pub fn new(table: Arc<CorrelationTable>) -> Self {
        Self { table }
    }

    /// Deliver one inbound envelope.
    ///
    /// Returns `true` if the envelope resolved a pending call.
    pub fn on_message(&self, envelope: InboundEnvelope) -> bool {
        let id = match RequestId::parse(&envelope.id) {
            Ok(id) => id,
            Err(e) => {
                debug!(raw_id = %envelope.id, error = %e, "Dropping response with malformed id");
                UNMATCHED_RESPONSES.inc();
                return false;
            }
        };

        let is_error = envelope.payload.is_error();
        if self.table.complete(id, envelope.payload) {
            debug!(correlation_id = %id, is_error, "Response matched pending call");
            true
        } else {
            debug!(correlation_id = %id, "Dropping unmatched response");
            UNMATCHED_RESPONSES.inc();
            false
        }
    }
}

//! Request initiator.

use crate::domain::{Completion, CorrelationTable, RequestId, TableError};
use std::sync::Arc;
use tracing::trace;

/// Mints ids and registers them before anything is published.
#[derive(Clone)]
pub struct RequestInitiator {
    table: Arc<CorrelationTable>,
}

impl RequestInitiator {
    pub fn new(table: Arc<CorrelationTable>) -> Self {
        Self { table }
    }

    /// Allocate a fresh id and mark it pending.
    ///
    /// The returned id is already in the table, so a response that overtakes
    /// the publish call is still recorded.
    pub fn begin(&self) -> Result<(RequestId, Completion), TableError> {
        let id = RequestId::new();
        let completion = self.table.register(id)?;
        trace!(correlation_id = %id, "Call initiated");
        Ok((id, completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_registers_fresh_ids() {
        let table = Arc::new(CorrelationTable::new());
        let initiator = RequestInitiator::new(Arc::clone(&table));

        let (first, _c1) = initiator.begin().unwrap();
        let (second, _c2) = initiator.begin().unwrap();

        assert_ne!(first, second);
        assert!(table.is_pending(&first));
        assert!(table.is_pending(&second));
        assert_eq!(table.pending_count(), 2);
    }
}

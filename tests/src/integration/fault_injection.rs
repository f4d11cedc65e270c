//! # Fault Injection Tests
//!
//! Workers that answer too late, never answer, or are not there at all.

#[cfg(test)]
mod tests {
    use super::super::Harness;
    use async_trait::async_trait;
    use courier_bus::{
        ErrorKind, EventFilter, EventTopic, InMemoryEventBus, Params, ResponsePayload, RpcError,
    };
    use courier_correlator::{
        BusTransport, Correlator, CorrelatorConfig, CorrelatorError, TransportError,
    };
    use courier_worker::{Dispatcher, MethodHandler};
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    /// Replies after a fixed delay.
    struct Slow(Duration);

    #[async_trait]
    impl MethodHandler for Slow {
        async fn handle(&self, _params: &Params) -> Result<Value, RpcError> {
            tokio::time::sleep(self.0).await;
            Ok(json!("late"))
        }
    }

    /// Always rejects its parameters.
    struct Picky;

    #[async_trait]
    impl MethodHandler for Picky {
        async fn handle(&self, _params: &Params) -> Result<Value, RpcError> {
            Err(RpcError::new(ErrorKind::InvalidParams, "dateFrom is required"))
        }
    }

    fn slow_harness(delay: Duration, timeout: Duration) -> Harness {
        let dispatcher = Dispatcher::builder().register("slow", Slow(delay)).build();
        Harness::start(dispatcher, timeout)
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_reply_after_timeout_is_dropped() {
        let harness = slow_harness(Duration::from_secs(5), Duration::from_secs(1));

        let payload = harness
            .correlator
            .call("slow", Params::new())
            .await
            .unwrap();
        assert_eq!(payload, ResponsePayload::from(RpcError::timeout()));

        // Let the worker's reply arrive
        tokio::time::sleep(Duration::from_secs(10)).await;

        let table = harness.correlator.table();
        assert!(table.is_empty());
        assert_eq!(table.stats().total_ignored.load(Ordering::Relaxed), 1);

        let (accepted, matched) = harness.stop().await;
        assert_eq!((accepted, matched), (1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight_call() {
        let harness = slow_harness(Duration::from_secs(5), Duration::from_secs(30));

        let call = harness
            .correlator
            .start("slow", Params::new())
            .await
            .unwrap();
        assert!(harness.correlator.cancel(&call.id()));

        let payload = call.wait().await.unwrap();
        assert_eq!(payload.error().map(|e| e.code), Some(499));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(harness.correlator.table().is_empty());

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_handler_error_reaches_caller() {
        let dispatcher = Dispatcher::builder().register("productstats", Picky).build();
        let harness = Harness::start(dispatcher, Duration::from_secs(30));

        let payload = harness
            .correlator
            .call("ProductStats", Params::new())
            .await
            .unwrap();
        let error = payload.error().unwrap();
        assert_eq!(error.kind(), Some(ErrorKind::InvalidParams));
        assert_eq!(error.message, "dateFrom is required");

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_no_worker_fails_fast() {
        let bus = Arc::new(InMemoryEventBus::new());
        let _responses = bus.subscribe(EventFilter::topics(vec![EventTopic::Responses]));
        let correlator = Correlator::new(
            &CorrelatorConfig::default(),
            Arc::new(BusTransport::new(Arc::clone(&bus))),
        )
        .unwrap();

        let err = correlator
            .call("gettestdata", Params::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CorrelatorError::Transport {
                source: TransportError::NoSubscribers(_),
                ..
            }
        ));
        assert!(correlator.table().is_empty());
    }

    #[tokio::test]
    async fn test_closed_bus_rejects_calls() {
        let harness = slow_harness(Duration::from_millis(1), Duration::from_secs(30));
        harness.bus.close();

        let err = harness
            .correlator
            .call("slow", Params::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CorrelatorError::Transport {
                source: TransportError::Closed,
                ..
            }
        ));
        assert!(harness.correlator.table().is_empty());

        harness.stop().await;
    }
}

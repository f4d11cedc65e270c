//! # End-to-End Tests
//!
//! ```text
//! Correlator ──Request──→ [Event Bus] ──→ WorkerService ──→ Dispatcher
//!     ↑                                                         │
//! ResponseListener ←── [Event Bus] ←──Response──────────────────┘
//! ```

#[cfg(test)]
mod tests {
    use super::super::Harness;
    use async_trait::async_trait;
    use courier_bus::{Params, ResponsePayload, RpcError};
    use courier_telemetry::{encode_metrics, register_metrics};
    use courier_worker::{default_dispatcher, Dispatcher, MethodHandler, TestDataHandler};
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    /// Answers like `gettestdata`, 10 ms later.
    struct DelayedTestData;

    #[async_trait]
    impl MethodHandler for DelayedTestData {
        async fn handle(&self, params: &Params) -> Result<Value, RpcError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            TestDataHandler.handle(params).await
        }
    }

    /// Returns its parameters after a random short delay.
    struct Echo;

    #[async_trait]
    impl MethodHandler for Echo {
        async fn handle(&self, params: &Params) -> Result<Value, RpcError> {
            let delay = rand::random::<u64>() % 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Value::Object(params.clone()))
        }
    }

    #[tokio::test]
    async fn test_gettestdata_round_trip() {
        let dispatcher = Dispatcher::builder()
            .register("gettestdata", DelayedTestData)
            .build();
        let harness = Harness::start(dispatcher, Duration::from_secs(30));

        let started = Instant::now();
        let payload = harness
            .correlator
            .call("gettestdata", Params::new())
            .await
            .unwrap();

        assert_eq!(payload, ResponsePayload::Result(json!({"test": "blabla"})));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(harness.correlator.table().is_empty());

        let (accepted, matched) = harness.stop().await;
        assert_eq!((accepted, matched), (1, 1));
    }

    #[tokio::test]
    async fn test_method_name_is_case_insensitive() {
        let harness = Harness::start(default_dispatcher(), Duration::from_secs(30));

        let payload = harness
            .correlator
            .call("GetTestData", Params::new())
            .await
            .unwrap();
        assert_eq!(payload.result(), Some(&json!({"test": "blabla"})));

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_method_round_trip() {
        let harness = Harness::start(default_dispatcher(), Duration::from_secs(30));

        let payload = harness
            .correlator
            .call("ProductStatistics", Params::new())
            .await
            .unwrap();

        let error = payload.error().unwrap();
        assert_eq!(error.code, 400);
        assert_eq!(error.message, "Unknown method productstatistics");

        harness.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_are_isolated() {
        const CALLS: usize = 50;
        let dispatcher = Dispatcher::builder().register("echo", Echo).build();
        let harness = Harness::start(dispatcher, Duration::from_secs(30));

        let calls = (0..CALLS).map(|n| {
            let mut params = Params::new();
            params.insert("n".into(), json!(n));
            harness.correlator.call("echo", params)
        });
        let results = futures::future::join_all(calls).await;

        for (n, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), ResponsePayload::Result(json!({"n": n})));
        }
        assert!(harness.correlator.table().is_empty());
        assert_eq!(
            harness.correlator.table().stats().total_taken.load(Ordering::Relaxed),
            CALLS as u64
        );

        let (accepted, matched) = harness.stop().await;
        assert_eq!(accepted, CALLS as u64);
        assert_eq!(matched, CALLS as u64);
    }

    #[tokio::test]
    async fn test_calls_are_visible_in_metrics() {
        register_metrics().unwrap();
        let harness = Harness::start(default_dispatcher(), Duration::from_secs(30));

        harness
            .correlator
            .call("gettestdata", Params::new())
            .await
            .unwrap();

        let exposition = encode_metrics().unwrap();
        assert!(exposition.contains("courier_correlator_calls_issued_total"));
        assert!(exposition.contains("courier_correlator_calls_completed_total"));

        harness.stop().await;
    }
}

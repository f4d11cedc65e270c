//! Canned reply used for smoke-testing a deployment end to end.

use crate::dispatch::MethodHandler;
use async_trait::async_trait;
use courier_bus::{Params, RpcError};
use serde_json::{json, Value};

/// Method name the handler is registered under.
pub const TEST_DATA_METHOD: &str = "gettestdata";

/// Returns `{"test": "blabla"}` whatever the parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestDataHandler;

#[async_trait]
impl MethodHandler for TestDataHandler {
    async fn handle(&self, _params: &Params) -> Result<Value, RpcError> {
        Ok(json!({"test": "blabla"}))
    }
}

//! # Method Dispatch
//!
//! Maps method names to handlers. The table is built once at startup and
//! is read-only afterwards.

use async_trait::async_trait;
use courier_bus::{ErrorKind, OutboundEnvelope, Params, ResponsePayload, RpcError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single remotely callable method.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Run the method. Failures are reported to the caller as error payloads.
    async fn handle(&self, params: &Params) -> Result<Value, RpcError>;
}

/// Explicit method table.
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl Dispatcher {
    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Whether a handler is registered for `method` (case-insensitive).
    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(&method.to_lowercase())
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Whether no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for an envelope and produce the reply payload.
    pub async fn dispatch(&self, envelope: &OutboundEnvelope) -> ResponsePayload {
        let method = envelope.method.to_lowercase();

        let Some(handler) = self.handlers.get(&method) else {
            warn!(correlation_id = %envelope.id, method = %envelope.method, "Unknown method");
            return RpcError::new(
                ErrorKind::UnknownMethod,
                format!("Unknown method {}", envelope.method),
            )
            .with_data(json!({ "available": self.methods() }))
            .into();
        };

        let result = handler.handle(&envelope.params).await;
        if let Err(e) = &result {
            debug!(
                correlation_id = %envelope.id,
                method = %method,
                code = e.code,
                error = %e.message,
                "Handler returned error"
            );
        }
        result.into()
    }
}

/// Builder for [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl DispatcherBuilder {
    /// Register `handler` under `method`. Names are stored lowercased; a
    /// later registration for the same name replaces the earlier one.
    pub fn register(mut self, method: &str, handler: impl MethodHandler + 'static) -> Self {
        let method = method.to_lowercase();
        if self
            .handlers
            .insert(method.clone(), Arc::new(handler))
            .is_some()
        {
            warn!(method = %method, "Replacing previously registered handler");
        }
        self
    }

    /// Finish the table.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            handlers: self.handlers,
        }
    }
}

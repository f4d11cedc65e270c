//! # Bus Events
//!
//! Envelope types that flow through the bus, the error shape shared by
//! local and remote failures, and topic filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::JSONRPC_VERSION;

/// Named call parameters, as carried in the `params` member of a request.
pub type Params = serde_json::Map<String, Value>;

fn jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

// =============================================================================
// ERRORS
// =============================================================================

/// Closed set of error kinds with stable numeric codes.
///
/// The code is chosen where the failure happens and travels inside
/// [`RpcError::code`]; it is never derived from a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The worker has no handler for the requested method.
    UnknownMethod,
    /// No response arrived before the caller's deadline.
    Timeout,
    /// The parameters could not be interpreted by the handler.
    InvalidParams,
    /// The caller abandoned the call before a response arrived.
    Cancelled,
    /// The handler failed while producing a result.
    Internal,
}

impl ErrorKind {
    /// Stable numeric code for this kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::UnknownMethod => 400,
            Self::Timeout => 408,
            Self::InvalidParams => 422,
            Self::Cancelled => 499,
            Self::Internal => 500,
        }
    }

    /// Message used when the failure site has nothing more specific to say.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::UnknownMethod => "Unknown method",
            Self::Timeout => "Request timeout",
            Self::InvalidParams => "Invalid params",
            Self::Cancelled => "Request cancelled",
            Self::Internal => "Internal error",
        }
    }

    /// Look up the kind carried by a numeric code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            400 => Some(Self::UnknownMethod),
            408 => Some(Self::Timeout),
            422 => Some(Self::InvalidParams),
            499 => Some(Self::Cancelled),
            500 => Some(Self::Internal),
            _ => None,
        }
    }
}

/// Structured error body, identical for locally synthesized failures and
/// errors reported by the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Human readable message.
    pub message: String,
    /// Numeric error code.
    pub code: i32,
    /// Optional additional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Create an error of the given kind with a specific message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: kind.code(),
            data: None,
        }
    }

    /// Create an error of the given kind with its default message.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    /// `{message: "Request timeout", code: 408}`
    #[must_use]
    pub fn timeout() -> Self {
        Self::from_kind(ErrorKind::Timeout)
    }

    /// `{message: "Request cancelled", code: 499}`
    #[must_use]
    pub fn cancelled() -> Self {
        Self::from_kind(ErrorKind::Cancelled)
    }

    /// Attach additional data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The kind matching this error's code, if it is one of ours.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.code)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

// =============================================================================
// ENVELOPES
// =============================================================================

/// Terminal payload of a call: either the remote result or an error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    /// Successful result document.
    Result(Value),
    /// Error body, remote or synthesized locally.
    Error(RpcError),
}

impl ResponsePayload {
    /// Whether this payload carries an error marker.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The result document, if successful.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Result(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The error body, if failed.
    #[must_use]
    pub fn error(&self) -> Option<&RpcError> {
        match self {
            Self::Result(_) => None,
            Self::Error(e) => Some(e),
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self {
            Self::Result(value) => Ok(value),
            Self::Error(e) => Err(e),
        }
    }
}

impl From<RpcError> for ResponsePayload {
    fn from(e: RpcError) -> Self {
        Self::Error(e)
    }
}

impl From<Result<Value, RpcError>> for ResponsePayload {
    fn from(result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(value) => Self::Result(value),
            Err(e) => Self::Error(e),
        }
    }
}

/// Request published by a caller: `{jsonrpc, method, params, id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    /// Protocol version.
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Named parameters.
    #[serde(default)]
    pub params: Params,
    /// Correlation identifier in string form.
    pub id: String,
}

impl OutboundEnvelope {
    /// Create a new request envelope.
    pub fn new(method: impl Into<String>, params: Params, id: impl Into<String>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

/// Reply delivered to callers: `{jsonrpc, id, result}` or `{jsonrpc, id, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    /// Protocol version.
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    /// Correlation identifier copied from the request.
    pub id: String,
    /// Result or error member.
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

impl InboundEnvelope {
    /// Create a reply envelope.
    pub fn new(id: impl Into<String>, payload: ResponsePayload) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id: id.into(),
            payload,
        }
    }

    /// Successful reply.
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self::new(id, ResponsePayload::Result(result))
    }

    /// Error reply.
    pub fn failure(id: impl Into<String>, error: RpcError) -> Self {
        Self::new(id, ResponsePayload::Error(error))
    }
}

// =============================================================================
// BUS EVENTS
// =============================================================================

/// Everything that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusEvent {
    /// Outbound call for a worker.
    Request(OutboundEnvelope),
    /// Reply for a waiting caller.
    Response(InboundEnvelope),
}

impl BusEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Request(_) => EventTopic::Requests,
            Self::Response(_) => EventTopic::Responses,
        }
    }

    /// Correlation identifier carried by the envelope.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Request(envelope) => &envelope.id,
            Self::Response(envelope) => &envelope.id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Calls travelling to workers.
    Requests,
    /// Replies travelling back to callers.
    Responses,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether events of `topic` pass this filter.
    #[must_use]
    pub fn covers(&self, topic: EventTopic) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&topic)
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        self.covers(event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::Timeout.code(), 408);
        assert_eq!(ErrorKind::UnknownMethod.code(), 400);
        assert_eq!(ErrorKind::from_code(499), Some(ErrorKind::Cancelled));
        assert_eq!(ErrorKind::from_code(-32000), None);
    }

    #[test]
    fn test_timeout_error_shape() {
        let value = serde_json::to_value(RpcError::timeout()).unwrap();
        assert_eq!(value, json!({"message": "Request timeout", "code": 408}));
    }

    #[test]
    fn test_error_data_serialized_when_present() {
        let error = RpcError::new(ErrorKind::UnknownMethod, "Unknown method stats")
            .with_data(json!({"method": "stats"}));

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"message": "Unknown method stats", "code": 400, "data": {"method": "stats"}})
        );
    }

    #[test]
    fn test_outbound_wire_format() {
        let envelope = OutboundEnvelope::new("gettestdata", Params::new(), "abc");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "gettestdata", "params": {}, "id": "abc"})
        );
    }

    #[test]
    fn test_inbound_result_from_wire() {
        let envelope: InboundEnvelope = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "result": {"test": "blabla"}
        }))
        .unwrap();

        assert_eq!(envelope.id, "abc");
        assert_eq!(envelope.payload.result(), Some(&json!({"test": "blabla"})));
    }

    #[test]
    fn test_inbound_error_from_wire_without_version() {
        let envelope: InboundEnvelope = serde_json::from_value(json!({
            "id": "abc",
            "error": {"message": "Unknown method foo", "code": 400}
        }))
        .unwrap();

        assert_eq!(envelope.jsonrpc, "2.0");
        let error = envelope.payload.error().unwrap();
        assert_eq!(error.kind(), Some(ErrorKind::UnknownMethod));
        assert!(envelope.payload.is_error());
    }

    #[test]
    fn test_inbound_serializes_flat() {
        let envelope = InboundEnvelope::failure("abc", RpcError::timeout());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["error"]["code"], 408);
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn test_event_topic_mapping() {
        let request = BusEvent::Request(OutboundEnvelope::new("m", Params::new(), "1"));
        let response = BusEvent::Response(InboundEnvelope::success("1", json!(null)));
        assert_eq!(request.topic(), EventTopic::Requests);
        assert_eq!(response.topic(), EventTopic::Responses);
        assert_eq!(response.correlation_id(), "1");
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        let event = BusEvent::Request(OutboundEnvelope::new("m", Params::new(), "1"));
        assert!(filter.matches(&event));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Responses]);

        let request = BusEvent::Request(OutboundEnvelope::new("m", Params::new(), "1"));
        assert!(!filter.matches(&request));

        let response = BusEvent::Response(InboundEnvelope::success("1", json!(1)));
        assert!(filter.matches(&response));
    }
}

//! # Courier Bus - Publish/Subscribe Transport for Correlated Calls
//!
//! Carries JSON-RPC style envelopes between callers and remote workers.
//! Requests and responses travel one way each; nothing on the bus knows
//! which response belongs to which request. Matching them up is the job of
//! `courier-correlator`.
//!
//! ```text
//! ┌──────────────┐   Request(envelope)   ┌──────────────┐
//! │    Caller    │ ────────┐             │    Worker    │
//! │ (correlator) │         ▼             │ (dispatcher) │
//! └──────────────┘   ┌──────────────┐    └──────────────┘
//!         ▲          │  Event Bus   │ ──────────┘ ▲
//!         └───────── │              │ ────────────┘
//!   Response(envelope└──────────────┘  Response(envelope)
//! ```
//!
//! The in-memory bus is single-process. A broker-backed deployment supplies
//! its own `Transport` implementation to the correlator instead.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{
    BusEvent, ErrorKind, EventFilter, EventTopic, InboundEnvelope, OutboundEnvelope, Params,
    ResponsePayload, RpcError,
};
pub use publisher::{BusError, EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// JSON-RPC protocol version stamped on every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

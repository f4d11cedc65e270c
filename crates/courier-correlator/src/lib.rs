// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Courier Correlator - synchronous calls over an asynchronous transport.
//!
//! A request is published on a one-way transport; its reply arrives later,
//! on another task, through the same or another broker. The correlator
//! joins the two on a random id and lets the caller simply `await` the
//! result.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          CORRELATOR                              │
//! │                                                                  │
//! │  call(method, params)                                            │
//! │     │                                                            │
//! │     ▼                                                            │
//! │  ┌───────────────────┐ register ┌──────────────────────┐          │
//! │  │ Request Initiator │ ───────▶ │  Correlation Table   │          │
//! │  └─────────┬─────────┘          │ pending ids, results │          │
//! │            │ publish            │    (one mutex)       │          │
//! │            ▼                    └───▲───────────▲──────┘          │
//! │  ┌───────────────────┐   complete  │           │ complete / take  │
//! │  │     Transport     │  ┌──────────┴────┐ ┌────┴───────┐          │
//! │  └─────────┬─────────┘  │ Response Sink │ │   Waiter   │          │
//! │            │            └───────▲───────┘ └────────────┘          │
//! └────────────┼────────────────────┼─────────────────────────────────┘
//!              ▼                    │
//!          requests ──▶ worker ──▶ responses
//! ```
//!
//! # Guarantees
//!
//! - Ids are registered before publication; a reply can never overtake its
//!   own registration.
//! - Each id resolves exactly once. A reply and the deadline racing for the
//!   same id are decided under the table lock, and the loser is a no-op.
//! - Replies for unknown, timed-out, or already consumed ids are dropped.
//!
//! # Usage
//!
//! ```ignore
//! use courier_correlator::{BusTransport, Correlator, CorrelatorConfig};
//!
//! let transport = Arc::new(BusTransport::new(bus));
//! let correlator = Correlator::new(&CorrelatorConfig::from_env(), transport.clone())?;
//! tokio::spawn(transport.response_listener(correlator.table().clone()).run());
//!
//! let payload = correlator.call("gettestdata", Params::new()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    Completion, ConfigError, CorrelationTable, CorrelatorConfig, CorrelatorError, RequestId,
    TableError, TableStats,
};
pub use ipc::{BusTransport, RequestInitiator, ResponseListener, ResponseSink, WaitState, Waiter};
pub use ports::{Transport, TransportError};
pub use service::{Correlator, PendingCall};

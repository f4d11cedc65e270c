//! IPC side of the correlator.
//!
//! The initiator and the waiter sit on the caller's task, the sink sits on
//! whichever task the transport delivers inbound messages from. All three
//! share one [`CorrelationTable`](crate::domain::CorrelationTable).

pub mod bus_adapter;
pub mod initiator;
pub mod listener;
pub mod sink;
pub mod waiter;

pub use bus_adapter::BusTransport;
pub use initiator::RequestInitiator;
pub use listener::ResponseListener;
pub use sink::ResponseSink;
pub use waiter::{WaitState, Waiter};

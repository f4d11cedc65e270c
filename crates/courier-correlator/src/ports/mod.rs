//! Ports (interfaces) of the correlator.

pub mod outbound;

pub use outbound::{Transport, TransportError};

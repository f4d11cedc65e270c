//! Domain types for the correlator.
//!
//! This module contains the correlation table, identifiers, configuration
//! and error handling. Nothing in here knows about a concrete transport.

pub mod config;
pub mod correlation;
pub mod error;
pub mod table;

// Re-exports for convenience
pub use config::CorrelatorConfig;
pub use correlation::RequestId;
pub use error::{ConfigError, CorrelatorError, TableError};
pub use table::{Completion, CorrelationTable, TableStats};

//! # Courier Worker
//!
//! The remote side of a correlated call: it receives request envelopes from
//! the bus, runs the handler registered for the method, and publishes the
//! reply with the same id.
//!
//! ```text
//!   Requests topic
//!        │
//!        ▼
//! ┌──────────────┐  lookup   ┌──────────────────────────┐
//! │ WorkerService│ ────────▶ │ Dispatcher               │
//! └──────┬───────┘           │  "gettestdata" → handler │
//!        │                   │  ...                     │
//!        │ reply             └──────────────────────────┘
//!        ▼
//!   Responses topic
//! ```
//!
//! ## Modules
//!
//! - `config/` - Worker configuration from the environment
//! - `dispatch/` - Method table and the `MethodHandler` port
//! - `handlers/` - Built-in method handlers
//! - `service/` - Bus loop

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod service;

pub use config::WorkerConfig;
pub use dispatch::{Dispatcher, DispatcherBuilder, MethodHandler};
pub use handlers::TestDataHandler;
pub use service::WorkerService;

/// Dispatcher with every built-in handler registered.
pub fn default_dispatcher() -> Dispatcher {
    Dispatcher::builder()
        .register(handlers::TEST_DATA_METHOD, TestDataHandler)
        .build()
}

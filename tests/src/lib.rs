//! # Courier Test Suite
//!
//! Flows that cross crate boundaries: a correlator, a worker and a
//! response listener sharing one in-memory bus.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── end_to_end.rs       # Calls answered by a real worker
//! │   └── fault_injection.rs  # Slow, silent and vanishing workers
//! └── benches/
//!     └── correlation_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p courier-tests
//! cargo bench -p courier-tests
//! ```

pub mod integration;

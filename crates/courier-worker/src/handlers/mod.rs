//! Built-in method handlers.

pub mod test_data;

pub use test_data::{TestDataHandler, TEST_DATA_METHOD};

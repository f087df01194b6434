//! Error handling.
//!
//! Errors are split by layer:
//! - **DatabaseError**: raised by the database adapter (file access, decoding, missing records)
//! - **LookupError**: raised by the lookup service (bad input, failed lookups, failed reloads)
//! - **InitializationError**: raised while setting up the process

mod types;

// Re-export public API
pub use types::{DatabaseError, InitializationError, LookupError};

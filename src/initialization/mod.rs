//! Process initialization.

mod logger;

// Re-export public API
pub use logger::init_logger_with;

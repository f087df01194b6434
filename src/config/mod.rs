//! Application configuration and constants.
//!
//! This module provides:
//! - Defaults and environment variable names
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export public API
pub use constants::*;
pub use types::{Config, LanguageTag, LogFormat, LogLevel, RunMode};

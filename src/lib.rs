//! ipinfo library: ASN and geolocation lookups over HTTP
//!
//! This library serves autonomous system and location data for IP addresses
//! from two MaxMind-format databases. Either database can be replaced at
//! runtime without interrupting lookups.
//!
//! # Example
//!
//! ```no_run
//! use ipinfo::geoip::{LookupService, MaxMindReader};
//! use ipinfo::LanguageTag;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = LookupService::open(
//!     Box::new(MaxMindReader),
//!     Path::new("dbip-asn-lite.mmdb"),
//!     Path::new("dbip-city-lite.mmdb"),
//!     LanguageTag::En,
//! )?;
//!
//! let info = service.resolve_combined("8.8.8.8")?;
//! println!("AS{} {} in {}", info.as_record.number, info.as_record.organization_name,
//!          info.location.country);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! [`run_server`] requires a Tokio runtime. Lookups themselves are synchronous.

mod app;
pub mod config;
pub mod error_handling;
pub mod geoip;
pub mod initialization;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};

// Re-export public API
pub use app::shutdown_signal;
pub use config::{Config, LanguageTag, LogFormat, LogLevel, RunMode};
pub use error_handling::{DatabaseError, InitializationError, LookupError};
pub use geoip::LookupService;

/// Loads both databases and serves HTTP until a shutdown signal arrives.
///
/// Fails without serving if either database cannot be loaded.
pub async fn run_server(config: Config) -> Result<()> {
    let addrs = config.listen_addrs().await?;

    let asn_db = config.asn_db.clone();
    let geo_db = config.geo_db.clone();
    let language = config.language;
    let service = tokio::task::spawn_blocking(move || {
        LookupService::open(Box::new(geoip::MaxMindReader), &asn_db, &geo_db, language)
    })
    .await
    .context("Database loading task failed")?
    .context("Failed to load databases")?;

    let state = server::AppState::new(
        Arc::new(service),
        config.asn_db.clone(),
        config.geo_db.clone(),
    );

    server::start_server(&addrs, state, shutdown_signal()).await?;

    // The router and its state are gone; dropping the last reference closes both databases
    log::info!("Closing databases");
    Ok(())
}

//! Configuration constants.
//!
//! Defaults for every setting and the environment variables that override them.

/// Default listening address (all interfaces, port 8080)
pub const DEFAULT_ADDR: &str = ":8080";
/// Default ASN database file
pub const DEFAULT_ASN_DB: &str = "./dbip-asn-lite-2021-06.mmdb";
/// Default City database file
pub const DEFAULT_GEO_DB: &str = "./dbip-city-lite-2021-06.mmdb";
/// Default language for localized names
pub const DEFAULT_LANG: &str = "en";

// Environment variables (overridden in turn by command-line flags)
pub const ENV_ADDR: &str = "IPINFO_ADDR";
pub const ENV_MODE: &str = "IPINFO_MODE";
pub const ENV_DB_ASN: &str = "IPINFO_DB_ASN";
pub const ENV_DB_GEOIP: &str = "IPINFO_DB_GEOIP";
pub const ENV_LANG: &str = "IPINFO_LANG";
pub const ENV_LOG_LEVEL: &str = "IPINFO_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "IPINFO_LOG_FORMAT";

/// Every environment variable read by the configuration
pub const ENV_VARS: [&str; 7] = [
    ENV_ADDR,
    ENV_MODE,
    ENV_DB_ASN,
    ENV_DB_GEOIP,
    ENV_LANG,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
];

/// Message returned with a failed reload
pub const RELOAD_FAILED_MESSAGE: &str = "failed to load database; using previous one...";

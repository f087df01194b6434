//! Configuration types and CLI options.
//!
//! Every setting has a hardcoded default, can be overridden by an environment
//! variable, and can be overridden again by a command-line flag.

use std::convert::Infallible;
use std::ffi::OsString;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::constants::{
    DEFAULT_ADDR, DEFAULT_ASN_DB, DEFAULT_GEO_DB, DEFAULT_LANG, ENV_ADDR, ENV_DB_ASN,
    ENV_DB_GEOIP, ENV_LANG, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MODE, ENV_VARS,
};
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run mode of the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Verbose logging, including every request
    Debug,
    /// Warnings and errors only
    Test,
    /// Startup, reload and error events
    Release,
}

impl RunMode {
    /// Log level used when none is configured explicitly.
    pub fn default_log_level(self) -> LogLevel {
        match self {
            RunMode::Debug => LogLevel::Debug,
            RunMode::Test => LogLevel::Warn,
            RunMode::Release => LogLevel::Info,
        }
    }
}

/// Language used for localized continent, country and city names.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString,
    Serialize,
)]
pub enum LanguageTag {
    #[default]
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    En,
    #[strum(serialize = "de")]
    #[serde(rename = "de")]
    De,
    #[strum(serialize = "es")]
    #[serde(rename = "es")]
    Es,
    #[strum(serialize = "fr")]
    #[serde(rename = "fr")]
    Fr,
    #[strum(serialize = "ja")]
    #[serde(rename = "ja")]
    Ja,
    #[strum(serialize = "pt-BR")]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[strum(serialize = "ru")]
    #[serde(rename = "ru")]
    Ru,
    #[strum(serialize = "zh-CN")]
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl LanguageTag {
    /// Maps `value` to a supported language, falling back to English for
    /// anything outside the allow-list.
    pub fn normalize(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::debug!("Unsupported language {:?}, using en", value);
            LanguageTag::En
        })
    }
}

fn parse_language(value: &str) -> Result<LanguageTag, Infallible> {
    Ok(LanguageTag::normalize(value))
}

/// Server configuration.
///
/// # Examples
///
/// ```bash
/// # Defaults: listen on :8080 and load the DB-IP lite databases from the working directory
/// ipinfo
///
/// # Environment variables
/// IPINFO_ADDR=127.0.0.1:9000 IPINFO_LANG=de ipinfo
///
/// # Flags take precedence over environment variables
/// IPINFO_LANG=de ipinfo --lang fr --db-asn ./asn.mmdb --db-geoip ./city.mmdb
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ipinfo",
    about = "Serves ASN and geolocation data for IP addresses over HTTP."
)]
pub struct Config {
    /// Listening address:port (":port" listens on all interfaces)
    #[arg(short = 'a', long = "addr", env = ENV_ADDR, default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Run mode: debug|test|release
    #[arg(short = 'm', long, env = ENV_MODE, value_enum, default_value_t = RunMode::Release)]
    pub mode: RunMode,

    /// ASN mmdb file
    #[arg(long = "db-asn", alias = "db_asn", env = ENV_DB_ASN, default_value = DEFAULT_ASN_DB)]
    pub asn_db: PathBuf,

    /// GeoIP mmdb file
    #[arg(long = "db-geoip", alias = "db_geoip", env = ENV_DB_GEOIP, default_value = DEFAULT_GEO_DB)]
    pub geo_db: PathBuf,

    /// Language used for names (available languages: de, en, es, fr, ja, pt-BR, ru, zh-CN)
    ///
    /// Any other value falls back to English.
    #[arg(short = 'l', long = "lang", env = ENV_LANG, default_value = DEFAULT_LANG, value_parser = parse_language)]
    pub language: LanguageTag,

    /// Log level: error|warn|info|debug|trace (defaults to the run mode's level)
    #[arg(long, env = ENV_LOG_LEVEL, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log format: plain|json
    #[arg(long, env = ENV_LOG_FORMAT, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            mode: RunMode::Release,
            asn_db: PathBuf::from(DEFAULT_ASN_DB),
            geo_db: PathBuf::from(DEFAULT_GEO_DB),
            language: LanguageTag::En,
            log_level: None,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Parses the process arguments and environment, exiting with usage on error.
    ///
    /// An `IPINFO_*` variable set to the empty string counts as unset.
    pub fn load() -> Self {
        unset_empty_env();
        Self::parse()
    }

    /// Like [`load`](Self::load), with explicit arguments and returning the
    /// parse error.
    pub fn try_load_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        unset_empty_env();
        Self::try_parse_from(args)
    }

    /// Log level in effect: the explicit one, or the run mode's default.
    pub fn effective_log_level(&self) -> LogLevel {
        self.log_level
            .unwrap_or_else(|| self.mode.default_log_level())
    }

    /// Resolves the configured listening address into bind candidates,
    /// tried in order.
    ///
    /// A bare `:port` listens on all interfaces: dual-stack `[::]` first, then
    /// IPv4 `0.0.0.0` for hosts without IPv6.
    pub async fn listen_addrs(&self) -> Result<Vec<SocketAddr>, InitializationError> {
        let invalid = || InitializationError::ListenAddressError(self.addr.clone());

        if let Some(port) = self.addr.strip_prefix(':') {
            let port: u16 = port.parse().map_err(|_| invalid())?;
            return Ok(vec![
                SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ]);
        }

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(self.addr.as_str())
            .await
            .map_err(|_| invalid())?
            .collect();
        if addrs.is_empty() {
            return Err(invalid());
        }
        Ok(addrs)
    }
}

/// Removes `IPINFO_*` variables that are set but empty, so they fall back to
/// their defaults instead of failing to parse.
fn unset_empty_env() {
    for name in ENV_VARS {
        if std::env::var_os(name).is_some_and(|value| value.is_empty()) {
            std::env::remove_var(name);
        }
    }
}

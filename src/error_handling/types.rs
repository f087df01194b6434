//! Error type definitions.
//!
//! This module defines the errors raised by the database adapter, the lookup
//! service and process initialization.

use std::net::IpAddr;
use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

use crate::geoip::DatabaseKind;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The configured listening address could not be parsed.
    #[error("Invalid listening address {0:?}")]
    ListenAddressError(String),
}

/// Errors reported by a [`DatabaseReader`](crate::geoip::DatabaseReader) or an
/// opened [`Database`](crate::geoip::Database).
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The database file could not be read.
    #[error("failed to read database file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a valid database.
    #[error("failed to parse database file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The file is a valid database of a type that cannot answer the query kind.
    #[error(
        "database file {} has type {database_type:?}, which is not a {expected} database",
        path.display()
    )]
    WrongType {
        path: PathBuf,
        database_type: String,
        expected: DatabaseKind,
    },

    /// The database holds no record for the address.
    #[error("no record found for {0}")]
    NotFound(IpAddr),

    /// The record for the address could not be decoded.
    #[error("malformed record for {ip}: {reason}")]
    Malformed { ip: IpAddr, reason: String },
}

/// Errors returned by the [`LookupService`](crate::geoip::LookupService).
#[derive(Error, Debug)]
pub enum LookupError {
    /// The textual input is not an IPv4 or IPv6 address.
    #[error("invalid ip address {0:?}")]
    InvalidInput(String),

    /// The database has no answer, or a malformed one, for a valid address.
    #[error("{database} lookup for {ip} failed: {source}")]
    Lookup {
        database: DatabaseKind,
        ip: IpAddr,
        #[source]
        source: DatabaseError,
    },

    /// Opening a database failed. When raised by a reload, the previous
    /// database is still serving.
    #[error("failed to load {database} database from {}: {source}", path.display())]
    Open {
        database: DatabaseKind,
        path: PathBuf,
        #[source]
        source: DatabaseError,
    },
}

impl LookupError {
    /// Returns true if the caller supplied something that is not an IP address.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LookupError::InvalidInput(_))
    }
}

//! Database reader boundary.
//!
//! The lookup service never touches a database format directly. It opens files
//! through a [`DatabaseReader`] and queries the resulting [`Database`] handles.
//! Closing a handle is its `Drop`.

use std::net::IpAddr;
use std::path::Path;

use crate::error_handling::DatabaseError;
use crate::geoip::types::{AsnData, CityData, DatabaseKind, DatabaseMetadata};

/// Opens database files into queryable handles.
pub trait DatabaseReader: Send + Sync {
    /// Opens `path` into an immutable, in-memory database.
    ///
    /// Fails with [`DatabaseError::WrongType`] when the file is a database that
    /// cannot answer `kind` queries.
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn Database>, DatabaseError>;
}

/// An opened, immutable lookup database.
///
/// Implementations must be safe to query from many threads at once.
pub trait Database: Send + Sync {
    /// Looks up the autonomous system record for `ip`.
    fn asn(&self, ip: IpAddr) -> Result<AsnData, DatabaseError>;

    /// Looks up the city record for `ip`.
    fn city(&self, ip: IpAddr) -> Result<CityData, DatabaseError>;

    /// Returns metadata describing the opened database.
    fn metadata(&self) -> DatabaseMetadata;
}

//! MaxMind DB (.mmdb) adapter.
//!
//! Works with MaxMind and DB-IP databases that follow the GeoLite2 ASN and City
//! record layouts. A file is only accepted for a query kind its declared
//! database type can answer.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error_handling::DatabaseError;
use crate::geoip::reader::{Database, DatabaseReader};
use crate::geoip::types::{AsnData, CityData, DatabaseKind, DatabaseMetadata, Place};

/// Database types carrying autonomous system records
const ASN_DATABASE_TYPES: &[&str] = &[
    "DBIP-ASN-Lite",
    "DBIP-ASN-Lite (compat=GeoLite2-ASN)",
    "GeoLite2-ASN",
    "GeoIP2-ISP",
    "GeoIP2-Precision-ISP",
];

/// Database types carrying city-level location records
const CITY_DATABASE_TYPES: &[&str] = &[
    "DBIP-City-Lite",
    "DBIP-Country-Lite",
    "DBIP-Country",
    "DBIP-Location (compat=City)",
    "GeoLite2-City",
    "GeoIP2-City",
    "GeoIP2-City-Africa",
    "GeoIP2-City-Asia-Pacific",
    "GeoIP2-City-Europe",
    "GeoIP2-City-North-America",
    "GeoIP2-City-South-America",
    "GeoIP2-Precision-City",
    "GeoIP2-Enterprise",
    "GeoIP2-Precision-Enterprise",
];

/// Returns true if a database of `database_type` can answer `kind` queries.
fn supports(kind: DatabaseKind, database_type: &str) -> bool {
    let known = match kind {
        DatabaseKind::Asn => ASN_DATABASE_TYPES,
        DatabaseKind::Geo => CITY_DATABASE_TYPES,
    };
    known.contains(&database_type)
}

/// Opens `.mmdb` files fully into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMindReader;

impl DatabaseReader for MaxMindReader {
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn Database>, DatabaseError> {
        let db_bytes = std::fs::read(path).map_err(|source| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let reader = Reader::from_source(db_bytes).map_err(|e| DatabaseError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let metadata = extract_metadata(&reader);
        if !supports(kind, &metadata.database_type) {
            return Err(DatabaseError::WrongType {
                path: path.to_path_buf(),
                database_type: metadata.database_type,
                expected: kind,
            });
        }
        log::debug!(
            "Parsed {} ({}) from {}",
            metadata.database_type,
            metadata.version,
            path.display()
        );

        Ok(Box::new(MaxMindDatabase { reader, metadata }))
    }
}

/// Extracts metadata from a MaxMind database
fn extract_metadata<T: AsRef<[u8]>>(reader: &Reader<T>) -> DatabaseMetadata {
    DatabaseMetadata::new(
        reader.metadata.database_type.clone(),
        reader.metadata.build_epoch,
    )
}

struct MaxMindDatabase {
    reader: Reader<Vec<u8>>,
    metadata: DatabaseMetadata,
}

impl MaxMindDatabase {
    fn decode<T: DeserializeOwned>(&self, ip: IpAddr) -> Result<T, DatabaseError> {
        let lookup = self
            .reader
            .lookup(ip)
            .map_err(|e| DatabaseError::Malformed {
                ip,
                reason: e.to_string(),
            })?;

        if !lookup.has_data() {
            return Err(DatabaseError::NotFound(ip));
        }

        match lookup.decode::<T>() {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(DatabaseError::NotFound(ip)),
            Err(e) => Err(DatabaseError::Malformed {
                ip,
                reason: e.to_string(),
            }),
        }
    }
}

impl Database for MaxMindDatabase {
    fn asn(&self, ip: IpAddr) -> Result<AsnData, DatabaseError> {
        let record: MmdbAsn = self.decode(ip)?;
        Ok(AsnData {
            number: record.autonomous_system_number,
            organization: record.autonomous_system_organization,
        })
    }

    fn city(&self, ip: IpAddr) -> Result<CityData, DatabaseError> {
        let record: MmdbCity = self.decode(ip)?;
        Ok(CityData {
            continent: record.continent.into(),
            country: record.country.into(),
            city: record.city.into(),
        })
    }

    fn metadata(&self) -> DatabaseMetadata {
        self.metadata.clone()
    }
}

// Record layouts. Unknown keys in the database are ignored.

#[derive(Debug, Default, Deserialize)]
struct MmdbAsn {
    #[serde(default)]
    autonomous_system_number: Option<u32>,
    #[serde(default)]
    autonomous_system_organization: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MmdbCity {
    #[serde(default)]
    continent: MmdbPlace,
    #[serde(default)]
    country: MmdbPlace,
    #[serde(default)]
    city: MmdbPlace,
}

#[derive(Debug, Default, Deserialize)]
struct MmdbPlace {
    /// Continent code
    #[serde(default)]
    code: Option<String>,
    /// Country code
    #[serde(default)]
    iso_code: Option<String>,
    #[serde(default)]
    names: BTreeMap<String, String>,
}

impl From<MmdbPlace> for Place {
    fn from(place: MmdbPlace) -> Self {
        Place {
            code: place.code.or(place.iso_code),
            names: place.names,
        }
    }
}

//! GeoIP data structures.
//!
//! This module defines the raw records produced by a database adapter and the
//! language-resolved records returned to callers.

use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::Display;

use crate::config::LanguageTag;

/// The two logical databases served by the lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum DatabaseKind {
    /// Autonomous system ownership database
    #[strum(serialize = "asn")]
    #[serde(rename = "asn")]
    Asn,
    /// Geographic location (city) database
    #[strum(serialize = "geoip")]
    #[serde(rename = "geoip")]
    Geo,
}

/// Metadata about an opened database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseMetadata {
    /// Database type as recorded by the vendor (e.g. "DBIP-ASN-Lite (compat=GeoLite2-ASN)")
    pub database_type: String,
    /// Seconds since the epoch at which the database was built
    pub build_epoch: u64,
    /// Database build version, derived from the build epoch
    pub version: String,
}

impl DatabaseMetadata {
    pub fn new(database_type: impl Into<String>, build_epoch: u64) -> Self {
        Self {
            database_type: database_type.into(),
            build_epoch,
            version: format!("build_{}", build_epoch),
        }
    }
}

/// Raw ASN record as stored in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsnData {
    pub number: Option<u32>,
    pub organization: Option<String>,
}

/// A named place (continent, country or city) with its localized names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    /// Continent code or ISO country code, when the database has one
    pub code: Option<String>,
    /// Localized names keyed by language tag ("en", "pt-BR", ...)
    pub names: BTreeMap<String, String>,
}

impl Place {
    /// Returns the name for `language`, or an empty string if the database has
    /// no localization for it. There is no fallback to another language.
    pub fn name(&self, language: LanguageTag) -> String {
        self.names
            .get(language.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    pub fn code(&self) -> String {
        self.code.clone().unwrap_or_default()
    }
}

/// Raw city record as stored in the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityData {
    pub continent: Place,
    pub country: Place,
    pub city: Place,
}

/// Autonomous system that owns an address.
///
/// The zero value means "no AS data"; callers must check the error result
/// rather than the zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsRecord {
    pub number: u32,
    #[serde(rename = "name")]
    pub organization_name: String,
}

impl From<AsnData> for AsRecord {
    fn from(data: AsnData) -> Self {
        Self {
            number: data.number.unwrap_or_default(),
            organization_name: data.organization.unwrap_or_default(),
        }
    }
}

/// Geographic location of an address, with names in the configured language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub continent: String,
    pub continent_code: String,
    pub country: String,
    pub country_code: String,
    pub city: String,
}

impl LocationRecord {
    pub(crate) fn from_city(data: &CityData, language: LanguageTag) -> Self {
        Self {
            continent: data.continent.name(language),
            continent_code: data.continent.code(),
            country: data.country.name(language),
            country_code: data.country.code(),
            city: data.city.name(language),
        }
    }
}

/// AS and location data for one address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombinedRecord {
    #[serde(rename = "as")]
    pub as_record: AsRecord,
    pub location: LocationRecord,
}

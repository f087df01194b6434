//! IP address lookups and database reloads.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use serde::Serialize;

use crate::config::LanguageTag;
use crate::error_handling::LookupError;
use crate::geoip::handle::DatabaseHandle;
use crate::geoip::reader::DatabaseReader;
use crate::geoip::slot::ResourceSlot;
use crate::geoip::types::{
    AsRecord, CombinedRecord, DatabaseKind, DatabaseMetadata, LocationRecord,
};

/// Answers ASN and location queries against two independently reloadable
/// databases.
///
/// All methods take `&self` and are safe to call from any number of threads
/// or tasks at once. Lookups never wait for a reload.
pub struct LookupService {
    reader: Box<dyn DatabaseReader>,
    asn: ResourceSlot<DatabaseHandle>,
    geo: ResourceSlot<DatabaseHandle>,
    language: LanguageTag,
}

/// Result of a successful reload.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadOutcome {
    pub database: DatabaseKind,
    pub source: String,
    pub generation: u64,
    pub metadata: DatabaseMetadata,
}

/// Snapshot of the handle currently serving one database.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub source: String,
    /// Seconds since the Unix epoch at which the handle was loaded
    pub loaded_at: u64,
    pub generation: u64,
    pub metadata: DatabaseMetadata,
}

/// Snapshot of the whole service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub language: LanguageTag,
    pub asn: DatabaseStatus,
    pub geo: DatabaseStatus,
}

impl LookupService {
    /// Opens both databases and builds the service.
    ///
    /// Fails if either database cannot be opened; the service never starts
    /// with a missing database.
    pub fn open(
        reader: Box<dyn DatabaseReader>,
        asn_path: &Path,
        geo_path: &Path,
        language: LanguageTag,
    ) -> Result<Self, LookupError> {
        let asn = DatabaseHandle::open(reader.as_ref(), DatabaseKind::Asn, asn_path)?;
        let geo = DatabaseHandle::open(reader.as_ref(), DatabaseKind::Geo, geo_path)?;
        log::info!(
            "Databases loaded: asn {} ({}), geoip {} ({})",
            asn.source().display(),
            asn.metadata().version,
            geo.source().display(),
            geo.metadata().version
        );
        Ok(Self::new(reader, asn, geo, language))
    }

    /// Builds the service from already opened handles.
    pub fn new(
        reader: Box<dyn DatabaseReader>,
        asn: DatabaseHandle,
        geo: DatabaseHandle,
        language: LanguageTag,
    ) -> Self {
        Self {
            reader,
            asn: ResourceSlot::new(Arc::new(asn)),
            geo: ResourceSlot::new(Arc::new(geo)),
            language,
        }
    }

    /// Looks up the autonomous system that owns `ip_text`.
    pub fn resolve_as(&self, ip_text: &str) -> Result<AsRecord, LookupError> {
        let ip = parse_ip(ip_text)?;
        let handle = self.asn.current();
        let data = handle
            .database()
            .asn(ip)
            .map_err(|source| LookupError::Lookup {
                database: DatabaseKind::Asn,
                ip,
                source,
            })?;
        Ok(data.into())
    }

    /// Looks up the location of `ip_text`, with names in the configured language.
    pub fn resolve_location(&self, ip_text: &str) -> Result<LocationRecord, LookupError> {
        let ip = parse_ip(ip_text)?;
        let handle = self.geo.current();
        let data = handle
            .database()
            .city(ip)
            .map_err(|source| LookupError::Lookup {
                database: DatabaseKind::Geo,
                ip,
                source,
            })?;
        Ok(LocationRecord::from_city(&data, self.language))
    }

    /// Looks up both AS and location data for `ip_text`.
    ///
    /// Location is the primary signal: a failed AS lookup leaves the `as`
    /// field at its zero value, while a failed location lookup fails the call.
    pub fn resolve_combined(&self, ip_text: &str) -> Result<CombinedRecord, LookupError> {
        let as_record = match self.resolve_as(ip_text) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Ignoring AS lookup failure for combined query: {}", e);
                AsRecord::default()
            }
        };
        let location = self.resolve_location(ip_text)?;
        Ok(CombinedRecord {
            as_record,
            location,
        })
    }

    /// Replaces the ASN database with the one at `path`.
    pub fn reload_asn(&self, path: &Path) -> Result<ReloadOutcome, LookupError> {
        self.reload(DatabaseKind::Asn, path)
    }

    /// Replaces the location database with the one at `path`.
    pub fn reload_geo(&self, path: &Path) -> Result<ReloadOutcome, LookupError> {
        self.reload(DatabaseKind::Geo, path)
    }

    /// Opens `path` and swaps it in. On failure the current handle keeps
    /// serving and nothing changes.
    pub fn reload(&self, kind: DatabaseKind, path: &Path) -> Result<ReloadOutcome, LookupError> {
        let handle = match DatabaseHandle::open(self.reader.as_ref(), kind, path) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Failed to reload {} database, keeping previous one: {}", kind, e);
                return Err(e);
            }
        };
        let metadata = handle.metadata().clone();

        let slot = self.slot(kind);
        let (old, generation) = slot.swap(Arc::new(handle));
        log::info!(
            "Reloaded {} database from {} ({}, generation {})",
            kind,
            path.display(),
            metadata.version,
            generation
        );

        // The old handle closes once in-flight queries release it
        if Arc::strong_count(&old) > 1 {
            log::debug!(
                "Deferring close of previous {} database until in-flight queries finish",
                kind
            );
        }
        drop(old);

        Ok(ReloadOutcome {
            database: kind,
            source: path.display().to_string(),
            generation,
            metadata,
        })
    }

    /// Returns the handle currently serving `kind`.
    pub fn handle(&self, kind: DatabaseKind) -> Arc<DatabaseHandle> {
        self.slot(kind).get()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            language: self.language,
            asn: self.database_status(DatabaseKind::Asn),
            geo: self.database_status(DatabaseKind::Geo),
        }
    }

    fn database_status(&self, kind: DatabaseKind) -> DatabaseStatus {
        let slot = self.slot(kind);
        let handle = slot.get();
        DatabaseStatus {
            source: handle.source().display().to_string(),
            loaded_at: handle
                .loaded_at()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            generation: slot.generation(),
            metadata: handle.metadata().clone(),
        }
    }

    fn slot(&self, kind: DatabaseKind) -> &ResourceSlot<DatabaseHandle> {
        match kind {
            DatabaseKind::Asn => &self.asn,
            DatabaseKind::Geo => &self.geo,
        }
    }
}

fn parse_ip(ip_text: &str) -> Result<IpAddr, LookupError> {
    ip_text
        .parse::<IpAddr>()
        .map_err(|_| LookupError::InvalidInput(ip_text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error_handling::DatabaseError;
    use crate::geoip::reader::Database;
    use crate::geoip::types::{AsnData, CityData, Place};

    #[derive(Clone, Default)]
    struct Records {
        asn: HashMap<IpAddr, AsnData>,
        city: HashMap<IpAddr, CityData>,
        epoch: u64,
    }

    struct MemoryDatabase {
        records: Records,
        queries: Arc<AtomicUsize>,
    }

    impl Database for MemoryDatabase {
        fn asn(&self, ip: IpAddr) -> Result<AsnData, DatabaseError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.records
                .asn
                .get(&ip)
                .cloned()
                .ok_or(DatabaseError::NotFound(ip))
        }

        fn city(&self, ip: IpAddr) -> Result<CityData, DatabaseError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.records
                .city
                .get(&ip)
                .cloned()
                .ok_or(DatabaseError::NotFound(ip))
        }

        fn metadata(&self) -> DatabaseMetadata {
            DatabaseMetadata::new("memory", self.records.epoch)
        }
    }

    #[derive(Default)]
    struct MemoryReader {
        files: Mutex<HashMap<PathBuf, Records>>,
        queries: Arc<AtomicUsize>,
    }

    impl MemoryReader {
        fn with(files: Vec<(&str, Records)>) -> Self {
            let reader = Self::default();
            {
                let mut map = reader.files.lock().expect("lock");
                for (path, records) in files {
                    map.insert(PathBuf::from(path), records);
                }
            }
            reader
        }
    }

    impl DatabaseReader for MemoryReader {
        fn open(
            &self,
            _kind: DatabaseKind,
            path: &Path,
        ) -> Result<Box<dyn Database>, DatabaseError> {
            let files = self.files.lock().expect("lock");
            let records = files.get(path).cloned().ok_or_else(|| DatabaseError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            Ok(Box::new(MemoryDatabase {
                records,
                queries: self.queries.clone(),
            }))
        }
    }

    fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn google() -> IpAddr {
        "8.8.8.8".parse().expect("valid ip")
    }

    fn asn_records(number: u32, name: &str) -> Records {
        let mut records = Records {
            epoch: number as u64,
            ..Default::default()
        };
        records.asn.insert(
            google(),
            AsnData {
                number: Some(number),
                organization: Some(name.to_string()),
            },
        );
        records
    }

    fn city_records() -> Records {
        let mut records = Records::default();
        records.city.insert(
            google(),
            CityData {
                continent: Place {
                    code: Some("NA".to_string()),
                    names: names(&[("en", "North America"), ("de", "Nordamerika")]),
                },
                country: Place {
                    code: Some("US".to_string()),
                    names: names(&[("en", "United States"), ("de", "Vereinigte Staaten")]),
                },
                city: Place {
                    code: None,
                    names: names(&[("en", "Mountain View")]),
                },
            },
        );
        records
    }

    fn service(language: LanguageTag) -> (LookupService, Arc<AtomicUsize>) {
        let reader = MemoryReader::with(vec![
            ("asn.mmdb", asn_records(15169, "Google LLC")),
            ("asn-next.mmdb", asn_records(64496, "Example Networks")),
            ("city.mmdb", city_records()),
            ("empty.mmdb", Records::default()),
        ]);
        let queries = reader.queries.clone();
        let service = LookupService::open(
            Box::new(reader),
            Path::new("asn.mmdb"),
            Path::new("city.mmdb"),
            language,
        )
        .expect("fixture databases open");
        (service, queries)
    }

    #[test]
    fn test_resolve_as() {
        let (service, _) = service(LanguageTag::En);
        let record = service.resolve_as("8.8.8.8").expect("record");
        assert_eq!(record.number, 15169);
        assert_eq!(record.organization_name, "Google LLC");
    }

    #[test]
    fn test_resolve_location() {
        let (service, _) = service(LanguageTag::En);
        let record = service.resolve_location("8.8.8.8").expect("record");
        assert_eq!(record.continent, "North America");
        assert_eq!(record.continent_code, "NA");
        assert_eq!(record.country, "United States");
        assert_eq!(record.country_code, "US");
        assert_eq!(record.city, "Mountain View");
    }

    #[test]
    fn test_resolve_location_without_localization() {
        let (service, _) = service(LanguageTag::De);
        let record = service.resolve_location("8.8.8.8").expect("record");
        assert_eq!(record.country, "Vereinigte Staaten");
        // City has no German name; no fallback to English
        assert_eq!(record.city, "");
        assert_eq!(record.country_code, "US");
    }

    #[test]
    fn test_invalid_input_never_queries_database() {
        let (service, queries) = service(LanguageTag::En);
        for input in ["not-an-ip", "", "256.1.1.1", "1.1.1", " 8.8.8.8", "8.8.8.8\0"] {
            let err = service.resolve_as(input).expect_err("invalid input");
            assert!(err.is_invalid_input(), "{:?} gave {}", input, err);
            let err = service.resolve_location(input).expect_err("invalid input");
            assert!(err.is_invalid_input(), "{:?} gave {}", input, err);
            let err = service.resolve_combined(input).expect_err("invalid input");
            assert!(err.is_invalid_input(), "{:?} gave {}", input, err);
        }
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ipv6_input_is_accepted() {
        let (service, _) = service(LanguageTag::En);
        let err = service.resolve_as("2001:db8::1").expect_err("not in fixture");
        assert!(matches!(
            err,
            LookupError::Lookup {
                database: DatabaseKind::Asn,
                source: DatabaseError::NotFound(_),
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_lookups_are_identical() {
        let (service, _) = service(LanguageTag::En);
        let first = service.resolve_combined("8.8.8.8").expect("record");
        for _ in 0..10 {
            assert_eq!(service.resolve_combined("8.8.8.8").expect("record"), first);
        }
    }

    #[test]
    fn test_combined_swallows_as_failure() {
        let (service, _) = service(LanguageTag::En);
        service
            .reload_asn(Path::new("empty.mmdb"))
            .expect("reload succeeds");
        let record = service.resolve_combined("8.8.8.8").expect("location wins");
        assert_eq!(record.as_record, AsRecord::default());
        assert_eq!(record.location.city, "Mountain View");
    }

    #[test]
    fn test_combined_surfaces_location_failure() {
        let (service, _) = service(LanguageTag::En);
        service
            .reload_geo(Path::new("empty.mmdb"))
            .expect("reload succeeds");
        assert!(service.resolve_as("8.8.8.8").is_ok());
        let err = service.resolve_combined("8.8.8.8").expect_err("location fails");
        assert!(matches!(
            err,
            LookupError::Lookup {
                database: DatabaseKind::Geo,
                ..
            }
        ));
    }

    #[test]
    fn test_reload_swaps_database() {
        let (service, _) = service(LanguageTag::En);
        let outcome = service
            .reload_asn(Path::new("asn-next.mmdb"))
            .expect("reload succeeds");
        assert_eq!(outcome.database, DatabaseKind::Asn);
        assert_eq!(outcome.generation, 1);
        assert_eq!(outcome.metadata.build_epoch, 64496);
        assert_eq!(service.resolve_as("8.8.8.8").expect("record").number, 64496);
        assert_eq!(
            service.handle(DatabaseKind::Asn).source(),
            Path::new("asn-next.mmdb")
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous_database() {
        let (service, _) = service(LanguageTag::En);
        let before = service.resolve_as("8.8.8.8").expect("record");

        let err = service
            .reload_asn(Path::new("missing.mmdb"))
            .expect_err("missing file");
        assert!(matches!(
            err,
            LookupError::Open {
                database: DatabaseKind::Asn,
                ..
            }
        ));

        assert_eq!(service.resolve_as("8.8.8.8").expect("record"), before);
        assert_eq!(service.status().asn.generation, 0);
        assert_eq!(service.status().asn.source, "asn.mmdb");
    }

    #[test]
    fn test_slots_are_independent() {
        let (service, _) = service(LanguageTag::En);
        service
            .reload_asn(Path::new("asn-next.mmdb"))
            .expect("reload succeeds");
        let status = service.status();
        assert_eq!(status.asn.generation, 1);
        assert_eq!(status.geo.generation, 0);
        assert_eq!(status.geo.source, "city.mmdb");
    }

    #[test]
    fn test_open_fails_without_both_databases() {
        let reader = MemoryReader::with(vec![("asn.mmdb", asn_records(1, "x"))]);
        let result = LookupService::open(
            Box::new(reader),
            Path::new("asn.mmdb"),
            Path::new("city.mmdb"),
            LanguageTag::En,
        );
        assert!(matches!(
            result,
            Err(LookupError::Open {
                database: DatabaseKind::Geo,
                ..
            })
        ));
    }
}

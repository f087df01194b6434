// Shared test helpers: an in-memory database reader standing in for .mmdb files.
//
// Each "file" is a set of records registered under a path. Opened handles count
// their queries and flag when they are closed, so tests can check that a
// swapped-out handle stays usable while in-flight queries hold it.

#![allow(dead_code)] // Each test file uses a subset

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ipinfo::geoip::{
    AsnData, CityData, Database, DatabaseKind, DatabaseMetadata, DatabaseReader, LookupService,
    Place,
};
use ipinfo::{DatabaseError, LanguageTag};

pub const ASN_PATH: &str = "fixtures/asn.mmdb";
pub const CITY_PATH: &str = "fixtures/city.mmdb";
pub const EMPTY_PATH: &str = "fixtures/empty.mmdb";

/// Records served by one fixture file.
#[derive(Clone, Default)]
pub struct FixtureRecords {
    pub asn: HashMap<IpAddr, AsnData>,
    pub city: HashMap<IpAddr, CityData>,
    pub build_epoch: u64,
    /// Kind of database the file declares itself as; `None` opens as either
    pub kind: Option<DatabaseKind>,
}

impl FixtureRecords {
    pub fn with_asn(mut self, ip: &str, number: u32, name: &str) -> Self {
        self.asn.insert(
            ip.parse().expect("valid fixture ip"),
            AsnData {
                number: Some(number),
                organization: Some(name.to_string()),
            },
        );
        self
    }

    pub fn with_city(mut self, ip: &str, city: CityData) -> Self {
        self.city.insert(ip.parse().expect("valid fixture ip"), city);
        self
    }

    pub fn with_epoch(mut self, build_epoch: u64) -> Self {
        self.build_epoch = build_epoch;
        self
    }

    pub fn for_kind(mut self, kind: DatabaseKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Lifecycle flags of one opened handle.
#[derive(Default)]
pub struct HandleState {
    pub closed: AtomicBool,
    pub queries: AtomicUsize,
}

pub struct FixtureDatabase {
    records: FixtureRecords,
    state: Arc<HandleState>,
}

impl FixtureDatabase {
    fn check_open(&self) {
        // A query reaching a closed handle is a use-after-release
        assert!(
            !self.state.closed.load(Ordering::SeqCst),
            "query on a closed database handle"
        );
        self.state.queries.fetch_add(1, Ordering::SeqCst);
    }
}

impl Database for FixtureDatabase {
    fn asn(&self, ip: IpAddr) -> Result<AsnData, DatabaseError> {
        self.check_open();
        self.records
            .asn
            .get(&ip)
            .cloned()
            .ok_or(DatabaseError::NotFound(ip))
    }

    fn city(&self, ip: IpAddr) -> Result<CityData, DatabaseError> {
        self.check_open();
        self.records
            .city
            .get(&ip)
            .cloned()
            .ok_or(DatabaseError::NotFound(ip))
    }

    fn metadata(&self) -> DatabaseMetadata {
        DatabaseMetadata::new("Fixture", self.records.build_epoch)
    }
}

impl Drop for FixtureDatabase {
    fn drop(&mut self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

/// Opens fixture files registered by path.
#[derive(Clone, Default)]
pub struct FixtureReader {
    files: Arc<Mutex<HashMap<PathBuf, FixtureRecords>>>,
    opened: Arc<Mutex<Vec<(PathBuf, Arc<HandleState>)>>>,
}

impl FixtureReader {
    pub fn insert(&self, path: &str, records: FixtureRecords) {
        self.files
            .lock()
            .expect("fixture lock")
            .insert(PathBuf::from(path), records);
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().expect("fixture lock").remove(Path::new(path));
    }

    /// States of every handle opened so far, in open order.
    pub fn opened(&self) -> Vec<(PathBuf, Arc<HandleState>)> {
        self.opened.lock().expect("fixture lock").clone()
    }

    pub fn total_queries(&self) -> usize {
        self.opened()
            .iter()
            .map(|(_, state)| state.queries.load(Ordering::SeqCst))
            .sum()
    }
}

impl DatabaseReader for FixtureReader {
    fn open(&self, kind: DatabaseKind, path: &Path) -> Result<Box<dyn Database>, DatabaseError> {
        let records = self
            .files
            .lock()
            .expect("fixture lock")
            .get(path)
            .cloned()
            .ok_or_else(|| DatabaseError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;

        if let Some(declared) = records.kind.filter(|declared| *declared != kind) {
            return Err(DatabaseError::WrongType {
                path: path.to_path_buf(),
                database_type: format!("Fixture-{}", declared),
                expected: kind,
            });
        }

        let state = Arc::new(HandleState::default());
        self.opened
            .lock()
            .expect("fixture lock")
            .push((path.to_path_buf(), state.clone()));

        Ok(Box::new(FixtureDatabase { records, state }))
    }
}

pub fn names(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn mountain_view() -> CityData {
    CityData {
        continent: Place {
            code: Some("NA".to_string()),
            names: names(&[("en", "North America"), ("fr", "Amérique du Nord")]),
        },
        country: Place {
            code: Some("US".to_string()),
            names: names(&[("en", "United States"), ("fr", "États-Unis")]),
        },
        city: Place {
            code: None,
            names: names(&[("en", "Mountain View")]),
        },
    }
}

/// A reader with the standard fixture files:
/// - ASN: 8.8.8.8 -> AS15169 "Google LLC" (opens only as an ASN database)
/// - City: 8.8.8.8 -> Mountain View, United States; 192.0.2.1 -> (no AS record)
///   (opens only as a City database)
/// - Empty: no records
pub fn fixture_reader() -> FixtureReader {
    let reader = FixtureReader::default();
    reader.insert(
        ASN_PATH,
        FixtureRecords::default()
            .with_asn("8.8.8.8", 15169, "Google LLC")
            .with_asn("2001:4860:4860::8888", 15169, "Google LLC")
            .with_epoch(1)
            .for_kind(DatabaseKind::Asn),
    );
    reader.insert(
        CITY_PATH,
        FixtureRecords::default()
            .with_city("8.8.8.8", mountain_view())
            .with_city("192.0.2.1", mountain_view())
            .with_epoch(1)
            .for_kind(DatabaseKind::Geo),
    );
    reader.insert(EMPTY_PATH, FixtureRecords::default());
    reader
}

/// A service over the standard fixture files.
pub fn fixture_service(language: LanguageTag) -> (LookupService, FixtureReader) {
    let reader = fixture_reader();
    let service = LookupService::open(
        Box::new(reader.clone()),
        Path::new(ASN_PATH),
        Path::new(CITY_PATH),
        language,
    )
    .expect("fixture databases open");
    (service, reader)
}

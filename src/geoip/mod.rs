//! IP lookups against hot-swappable MaxMind databases.
//!
//! This module provides:
//! - The [`DatabaseReader`] / [`Database`] boundary isolating the database format
//! - A MaxMind DB adapter ([`MaxMindReader`])
//! - [`ResourceSlot`], the lock-free holder of the active handle for one database
//! - [`LookupService`], which validates input, queries the ASN and City slots and
//!   drives reloads
//!
//! Lookups load the current handle without locking. A reload opens the new file
//! first and only then swaps it in, so a failed reload leaves the previous
//! database serving. The previous handle is closed once the last query that
//! observed it has finished.

mod handle;
mod mmdb;
mod reader;
mod service;
mod slot;
mod types;

// Re-export public API
pub use handle::DatabaseHandle;
pub use mmdb::MaxMindReader;
pub use reader::{Database, DatabaseReader};
pub use service::{DatabaseStatus, LookupService, ReloadOutcome, ServiceStatus};
pub use slot::ResourceSlot;
pub use types::{
    AsRecord, AsnData, CityData, CombinedRecord, DatabaseKind, DatabaseMetadata, LocationRecord,
    Place,
};

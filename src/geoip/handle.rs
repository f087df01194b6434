//! Opened database handles.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error_handling::LookupError;
use crate::geoip::reader::{Database, DatabaseReader};
use crate::geoip::types::{DatabaseKind, DatabaseMetadata};

/// An opened database together with where and when it was loaded.
///
/// A handle is immutable. It is closed when dropped, which happens once the
/// owning slot has moved on and every query that observed it has finished.
pub struct DatabaseHandle {
    kind: DatabaseKind,
    source: PathBuf,
    loaded_at: SystemTime,
    metadata: DatabaseMetadata,
    database: Box<dyn Database>,
}

impl DatabaseHandle {
    /// Opens `path` with `reader`, wrapping adapter failures with the database
    /// kind and path.
    pub fn open(
        reader: &dyn DatabaseReader,
        kind: DatabaseKind,
        path: &Path,
    ) -> Result<Self, LookupError> {
        log::info!("Loading {} database from: {}", kind, path.display());

        let database = reader.open(kind, path).map_err(|source| LookupError::Open {
            database: kind,
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(kind, path, database))
    }

    pub fn new(kind: DatabaseKind, source: &Path, database: Box<dyn Database>) -> Self {
        let metadata = database.metadata();
        Self {
            kind,
            source: source.to_path_buf(),
            loaded_at: SystemTime::now(),
            metadata,
            database,
        }
    }

    pub fn kind(&self) -> DatabaseKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl Drop for DatabaseHandle {
    fn drop(&mut self) {
        log::debug!(
            "Closing {} database {} ({})",
            self.kind,
            self.source.display(),
            self.metadata.version
        );
    }
}

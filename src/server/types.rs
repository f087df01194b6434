//! HTTP server state and response bodies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::geoip::{DatabaseKind, LookupService};

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LookupService>,
    /// Files reloaded by `/asn/reload` and `/geo/reload`
    pub asn_path: Arc<PathBuf>,
    pub geo_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(service: Arc<LookupService>, asn_path: PathBuf, geo_path: PathBuf) -> Self {
        Self {
            service,
            asn_path: Arc::new(asn_path),
            geo_path: Arc::new(geo_path),
        }
    }

    pub fn path(&self, kind: DatabaseKind) -> &Path {
        match kind {
            DatabaseKind::Asn => self.asn_path.as_path(),
            DatabaseKind::Geo => self.geo_path.as_path(),
        }
    }
}

/// JSON body for failed lookups
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON body for successful reloads
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub message: String,
    pub generation: u64,
}

/// JSON body for failed reloads
#[derive(Debug, Serialize)]
pub struct ReloadErrorResponse {
    pub error: String,
    pub message: &'static str,
}

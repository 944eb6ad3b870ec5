use std::path::PathBuf;

use tracing::debug;

use super::{
    read_table, DataError, GeoRiskRecord, RouteRecord, SanctionsEntity, SupplierDataSource,
    SupplierRecord, GEO_RISK_FILE, ROUTES_FILE, SANCTIONS_FILE, SUPPLIERS_FILE,
};

/// Loads pipeline inputs from CSV files located under a base directory.
#[derive(Debug, Clone)]
pub struct FileDataRepository {
    base_path: PathBuf,
}

impl FileDataRepository {
    /// Create a repository rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn suppliers_path(&self) -> PathBuf {
        self.base_path.join(SUPPLIERS_FILE)
    }

    pub fn routes_path(&self) -> PathBuf {
        self.base_path.join(ROUTES_FILE)
    }

    pub fn sanctions_path(&self) -> PathBuf {
        self.base_path.join(SANCTIONS_FILE)
    }

    pub fn geo_risk_path(&self) -> PathBuf {
        self.base_path.join(GEO_RISK_FILE)
    }

    fn load<T: serde::de::DeserializeOwned>(&self, path: PathBuf) -> Result<Vec<T>, DataError> {
        let rows = read_table(&path)?;
        debug!(path = %path.display(), rows = rows.len(), "loaded table");
        Ok(rows)
    }
}

impl SupplierDataSource for FileDataRepository {
    fn suppliers(&self) -> Result<Vec<SupplierRecord>, DataError> {
        self.load(self.suppliers_path())
    }

    fn routes(&self) -> Result<Vec<RouteRecord>, DataError> {
        self.load(self.routes_path())
    }

    fn sanctions(&self) -> Result<Vec<SanctionsEntity>, DataError> {
        self.load(self.sanctions_path())
    }

    fn geo_risk(&self) -> Result<Vec<GeoRiskRecord>, DataError> {
        self.load(self.geo_risk_path())
    }
}

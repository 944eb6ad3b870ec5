use std::{
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod file_repository;

pub const SUPPLIERS_FILE: &str = "suppliers.csv";
pub const ROUTES_FILE: &str = "shipping_routes.csv";
pub const SANCTIONS_FILE: &str = "sanctions.csv";
pub const GEO_RISK_FILE: &str = "geo_risk.csv";

/// Row of `suppliers.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub supplier_id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub ownership_parent: Option<String>,
    /// Delivery reliability in `[0, 1]`; higher is better.
    #[serde(default)]
    pub reliability_score: Option<f64>,
    /// Share of sourcing concentrated on this supplier, `[0, 1]`.
    #[serde(default)]
    pub concentration_share: Option<f64>,
    #[serde(default)]
    pub sanctions_flag: Option<i64>,
}

/// Row of `shipping_routes.csv`. Many routes may reference one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub supplier_id: String,
    #[serde(default)]
    pub transit_risk: Option<f64>,
}

/// Row of `sanctions.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionsEntity {
    #[serde(default)]
    pub entity: Option<String>,
}

/// Row of `geo_risk.csv`: four country-level sub-risks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRiskRecord {
    pub country: String,
    #[serde(default)]
    pub political_risk: Option<f64>,
    #[serde(default)]
    pub regulatory_risk: Option<f64>,
    #[serde(default)]
    pub conflict_risk: Option<f64>,
    #[serde(default)]
    pub currency_risk: Option<f64>,
}

impl GeoRiskRecord {
    /// Unweighted mean of the sub-risks that are present.
    pub fn mean_risk(&self) -> Option<f64> {
        mean(
            [
                self.political_risk,
                self.regulatory_risk,
                self.conflict_risk,
                self.currency_risk,
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// Supplier joined with route and sanctions data; the `merged_data.csv` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSupplier {
    pub supplier_id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub ownership_parent: Option<String>,
    #[serde(default)]
    pub reliability_score: Option<f64>,
    #[serde(default)]
    pub concentration_share: Option<f64>,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub sanctions_flag: u8,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub avg_transit_risk: f64,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub sanctions_match: bool,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub sanctions_risk: u8,
}

/// Errors raised while reading or writing pipeline tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing required data file: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("malformed CSV in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to encode CSV for {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Abstraction over input loading so the pipeline can run from files or in-memory fixtures.
pub trait SupplierDataSource {
    fn suppliers(&self) -> Result<Vec<SupplierRecord>, DataError>;

    fn routes(&self) -> Result<Vec<RouteRecord>, DataError>;

    fn sanctions(&self) -> Result<Vec<SanctionsEntity>, DataError>;

    /// Country-level indicators; only the assess stage reads these.
    fn geo_risk(&self) -> Result<Vec<GeoRiskRecord>, DataError>;
}

/// Read every row of a headed CSV file, failing fast when the file is absent.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    if !path.exists() {
        return Err(DataError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let parse_err = |source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(parse_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(parse_err)
}

/// Serialize rows into a headed CSV file.
///
/// The file only appears at `path` once every row has been written, so a
/// failed stage never leaves a truncated artifact behind.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DataError> {
    let encode_err = |source| DataError::Encode {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(encode_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| encode_err(csv::Error::from(err.into_error())))?;
    write_atomic(path, &bytes)
}

/// Write a UTF-8 text artifact with the same all-or-nothing guarantee as [`write_table`].
pub fn write_text(path: &Path, contents: &str) -> Result<(), DataError> {
    write_atomic(path, contents.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DataError> {
    let write_err = |source| DataError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;
    let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    staged.write_all(bytes).map_err(write_err)?;
    staged.flush().map_err(write_err)?;
    staged.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

/// Arithmetic mean, `None` for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Deserialize an empty CSV cell as the type's default.
pub(crate) fn default_if_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

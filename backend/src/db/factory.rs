//! Zone source factory.
//!
//! Creates the configured [`ZoneRepository`] and builds the [`ZoneIndex`] from it.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::index::ZoneIndex;
#[cfg(feature = "csv-zones")]
use super::repositories::CsvZoneRepository;
use super::repositories::LocalZoneRepository;
use super::repository::ZoneRepository;
use crate::config::ZonesConfig;
use crate::error::{ParkingError, ParkingResult};
use crate::models::ZoneRow;

/// Zone source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSourceType {
    /// CSV file read with polars
    Csv,
    /// In-memory rows
    Local,
}

impl FromStr for ZoneSourceType {
    type Err = String;

    /// Parse zone source type from string (`csv`, `local` or `memory`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown zone source type: {}", s)),
        }
    }
}

impl ZoneSourceType {
    /// Zone source type from the environment.
    ///
    /// Reads `ZONE_SOURCE`. Defaults to CSV when `ZONES_CSV` is set, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("ZONE_SOURCE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("ZONES_CSV").is_ok() {
            Self::Csv
        } else {
            Self::Local
        }
    }
}

/// Factory for zone sources.
pub struct ZoneRepositoryFactory;

impl ZoneRepositoryFactory {
    /// Create a zone source of the given type.
    ///
    /// # Arguments
    /// * `source_type` - Kind of source
    /// * `csv_path` - CSV file (required for [`ZoneSourceType::Csv`])
    pub fn create(
        source_type: ZoneSourceType,
        csv_path: Option<&Path>,
    ) -> ParkingResult<Arc<dyn ZoneRepository>> {
        match source_type {
            ZoneSourceType::Csv => {
                let path = csv_path.ok_or_else(|| {
                    ParkingError::configuration("CSV zone source requires a file path")
                })?;
                Self::create_csv(path)
            }
            ZoneSourceType::Local => Ok(Self::create_local(Vec::new())),
        }
    }

    /// Create a CSV zone source.
    #[cfg(feature = "csv-zones")]
    pub fn create_csv(path: &Path) -> ParkingResult<Arc<dyn ZoneRepository>> {
        Ok(Arc::new(CsvZoneRepository::new(path)))
    }

    #[cfg(not(feature = "csv-zones"))]
    pub fn create_csv(_path: &Path) -> ParkingResult<Arc<dyn ZoneRepository>> {
        Err(ParkingError::configuration(
            "CSV zone source feature not enabled",
        ))
    }

    /// Create an in-memory zone source holding `rows`.
    pub fn create_local(rows: Vec<ZoneRow>) -> Arc<dyn ZoneRepository> {
        Arc::new(LocalZoneRepository::with_rows(rows))
    }

    /// Create the zone source described by the `[zones]` configuration section.
    pub fn from_config(config: &ZonesConfig) -> ParkingResult<Arc<dyn ZoneRepository>> {
        Self::create(config.source_type()?, Some(&config.csv_path))
    }
}

/// Builder for configuring zone source creation.
pub struct ZoneRepositoryBuilder {
    source_type: ZoneSourceType,
    csv_path: Option<PathBuf>,
    rows: Vec<ZoneRow>,
}

impl ZoneRepositoryBuilder {
    /// Defaults to the source type selected by the environment.
    pub fn new() -> Self {
        Self {
            source_type: ZoneSourceType::from_env(),
            csv_path: std::env::var("ZONES_CSV").ok().map(PathBuf::from),
            rows: Vec::new(),
        }
    }

    pub fn source_type(mut self, source_type: ZoneSourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    /// Initial rows for a local source.
    pub fn rows(mut self, rows: Vec<ZoneRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn build(self) -> ParkingResult<Arc<dyn ZoneRepository>> {
        match self.source_type {
            ZoneSourceType::Local => Ok(ZoneRepositoryFactory::create_local(self.rows)),
            ZoneSourceType::Csv => {
                ZoneRepositoryFactory::create(self.source_type, self.csv_path.as_deref())
            }
        }
    }
}

impl Default for ZoneRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Load every row of `repository` and index it.
pub async fn load_index(
    repository: &dyn ZoneRepository,
    precision: u32,
) -> ParkingResult<ZoneIndex> {
    let rows = repository
        .load_rows()
        .await
        .map_err(|e| e.with_operation("load_zones"))?;
    let index = ZoneIndex::from_rows(&rows, precision);
    log::info!(
        "Indexed {} zones from {} ({} skipped)",
        index.len(),
        repository.describe(),
        index.skipped()
    );
    Ok(index)
}

//! Zone table stored as a CSV file, read with polars.
//!
//! Every column is read as text so that parsing, and the decision to skip a malformed
//! row, stays with [`ZoneRow::parse`](crate::models::ZoneRow::parse).

use async_trait::async_trait;
use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::db::repository::ZoneRepository;
use crate::error::{ErrorContext, ParkingError, ParkingResult};
use crate::models::{
    ZoneRow, COLUMN_AVG_TIME_TO_PARK, COLUMN_LATITUDE_SW, COLUMN_LONGITUDE_SW,
    COLUMN_SEARCHING_BY_HOUR,
};

/// CSV-backed zone source.
#[derive(Debug, Clone)]
pub struct CsvZoneRepository {
    path: PathBuf,
}

impl CsvZoneRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error_context(&self) -> ErrorContext {
        ErrorContext::new("load_zones")
            .with_entity("csv")
            .with_entity_id(self.path.display())
    }
}

#[async_trait]
impl ZoneRepository for CsvZoneRepository {
    async fn load_rows(&self) -> ParkingResult<Vec<ZoneRow>> {
        let path = self.path.clone();
        let context = self.error_context();
        let rows = tokio::task::spawn_blocking(move || read_zone_rows(&path))
            .await
            .map_err(|e| {
                ParkingError::internal_with_context(
                    format!("CSV reader task failed: {}", e),
                    context,
                )
            })??;
        log::debug!("Read {} zone rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    async fn health_check(&self) -> ParkingResult<bool> {
        Ok(tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false))
    }

    fn describe(&self) -> String {
        format!("csv zones at {}", self.path.display())
    }
}

/// Read the zone columns of a CSV file as raw rows.
///
/// `Latitude_SW`, `Longitude_SW` and `AvgTimeToPark` are required; `SearchingByHour` may
/// be absent, in which case every row has no hourly stats.
pub fn read_zone_rows(path: &Path) -> ParkingResult<Vec<ZoneRow>> {
    let context = || {
        ErrorContext::new("load_zones")
            .with_entity("csv")
            .with_entity_id(path.display())
    };

    if !path.is_file() {
        return Err(ParkingError::configuration_with_context(
            "Zone CSV file not found",
            context(),
        ));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        // Extra trailing cells are dropped so one ragged line cannot reject the file
        .with_parse_options(CsvParseOptions::default().with_truncate_ragged_lines(true))
        .try_into_reader_with_file_path(Some(path.into()))
        .and_then(|reader| reader.finish())
        .map_err(|e| {
            ParkingError::configuration_with_context(
                format!("Failed to parse zone CSV: {}", e),
                context(),
            )
        })?;

    let latitude = text_column(&df, COLUMN_LATITUDE_SW)
        .map_err(|e| missing_column(COLUMN_LATITUDE_SW, e, context()))?;
    let longitude = text_column(&df, COLUMN_LONGITUDE_SW)
        .map_err(|e| missing_column(COLUMN_LONGITUDE_SW, e, context()))?;
    let avg_time = text_column(&df, COLUMN_AVG_TIME_TO_PARK)
        .map_err(|e| missing_column(COLUMN_AVG_TIME_TO_PARK, e, context()))?;
    let searching = text_column(&df, COLUMN_SEARCHING_BY_HOUR).ok();
    if searching.is_none() {
        log::warn!(
            "{} has no {} column; hourly stats unavailable",
            path.display(),
            COLUMN_SEARCHING_BY_HOUR
        );
    }

    let latitude = latitude.str().map_err(|e| polars_error(e, context()))?;
    let longitude = longitude.str().map_err(|e| polars_error(e, context()))?;
    let avg_time = avg_time.str().map_err(|e| polars_error(e, context()))?;
    let searching = match searching.as_ref() {
        Some(column) => Some(column.str().map_err(|e| polars_error(e, context()))?),
        None => None,
    };

    let rows = (0..df.height())
        .map(|i| ZoneRow {
            latitude_sw: latitude.get(i).map(str::to_string),
            longitude_sw: longitude.get(i).map(str::to_string),
            avg_time_to_park: avg_time.get(i).map(str::to_string),
            searching_by_hour: searching.and_then(|s| s.get(i)).map(str::to_string),
        })
        .collect();

    Ok(rows)
}

fn text_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
    df.column(name)?.cast(&DataType::String)
}

fn missing_column(name: &str, err: PolarsError, context: ErrorContext) -> ParkingError {
    ParkingError::configuration_with_context(
        format!("Zone CSV is missing column '{}': {}", name, err),
        context,
    )
}

fn polars_error(err: PolarsError, context: ErrorContext) -> ParkingError {
    ParkingError::internal_with_context(format!("Zone CSV column error: {}", err), context)
}

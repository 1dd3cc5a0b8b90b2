//! Zone source implementations:
//! - `csv`: zone table stored as a CSV file
//! - `local`: in-memory rows for tests and local development
#[cfg(feature = "csv-zones")]
pub mod csv;
pub mod local;

#[cfg(feature = "csv-zones")]
pub use csv::CsvZoneRepository;
pub use local::LocalZoneRepository;

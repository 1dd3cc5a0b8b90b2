//! Application configuration.
//!
//! Settings come from a TOML file with `[zones]`, `[maps]`, `[detection]`, `[pipeline]`
//! and `[server]` sections, every field optional, followed by environment overrides:
//!
//! - `PARKWISE_CONFIG`: path of the TOML file
//! - `GOOGLE_MAPS_API_KEY`: maps API key
//! - `ZONE_SOURCE`: `csv` or `local`
//! - `ZONES_CSV`: path of the zone CSV file
//! - `PARKWISE_WORKERS`: enrichment worker count
//! - `HOST` / `PORT`: HTTP bind address

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::db::factory::ZoneSourceType;
use crate::db::index::KEY_PRECISION_RANGE;
use crate::error::{ErrorContext, ParkingError, ParkingResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub zones: ZonesConfig,
    #[serde(default)]
    pub maps: MapsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where parking zones come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonesConfig {
    /// `csv` or `local`
    #[serde(default = "default_zone_source")]
    pub source: String,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    /// Decimal places used to match zone corners
    #[serde(default = "default_key_precision")]
    pub key_precision: u32,
    /// Rebuild the zone index from the source at the start of every run
    #[serde(default)]
    pub reload_each_run: bool,
}

/// Geocoding and directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

/// Slot detection over zone images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Program and arguments run once per pipeline run; empty disables the run
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Directory holding one `<candidate id>.txt` label file per zone image
    #[serde(default = "default_labels_dir")]
    pub labels_dir: PathBuf,
    /// Label class that marks an empty slot
    #[serde(default = "default_empty_slot_class")]
    pub empty_slot_class: String,
    /// Delete stale label files before running the command
    #[serde(default = "default_true")]
    pub clean_labels: bool,
    #[serde(default = "default_command_timeout_sec")]
    pub command_timeout_sec: u64,
}

/// Pipeline concurrency, timeouts and retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// HTTP bind address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_zone_source() -> String {
    "csv".to_string()
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/parking_zones.csv")
}

fn default_key_precision() -> u32 {
    crate::db::index::DEFAULT_KEY_PRECISION
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_request_timeout_sec() -> u64 {
    10
}

fn default_labels_dir() -> PathBuf {
    PathBuf::from("detection/labels")
}

fn default_empty_slot_class() -> String {
    "0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_command_timeout_sec() -> u64 {
    300
}

fn default_workers() -> usize {
    8
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            source: default_zone_source(),
            csv_path: default_csv_path(),
            key_precision: default_key_precision(),
            reload_each_run: false,
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_maps_base_url(),
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            working_dir: None,
            labels_dir: default_labels_dir(),
            empty_slot_class: default_empty_slot_class(),
            clean_labels: true,
            command_timeout_sec: default_command_timeout_sec(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            call_timeout_ms: default_call_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ZonesConfig {
    pub fn source_type(&self) -> ParkingResult<ZoneSourceType> {
        ZoneSourceType::from_str(&self.source).map_err(|e| {
            ParkingError::configuration_with_context(e, ErrorContext::new("config").with_entity("zones"))
        })
    }
}

impl MapsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_sec)
    }
}

impl DetectionConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_sec)
    }
}

impl PipelineConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl ServerConfig {
    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` if successful
    /// * `Err(ParkingError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> ParkingResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("config").with_entity_id(path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            ParkingError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                context(),
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            ParkingError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                context(),
            )
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `parkwise.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> ParkingResult<Self> {
        let search_paths = [
            PathBuf::from("parkwise.toml"),
            PathBuf::from("backend/parkwise.toml"),
            PathBuf::from("../parkwise.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ParkingError::configuration(
            "No parkwise.toml found in standard locations",
        ))
    }

    /// Resolve the configuration for this process.
    ///
    /// Reads the file named by `PARKWISE_CONFIG` (an error if it is unreadable), otherwise
    /// the default location, otherwise built-in defaults. Environment overrides are applied
    /// last and the result is validated.
    pub fn load() -> ParkingResult<Self> {
        let mut config = match std::env::var("PARKWISE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::from_default_location().unwrap_or_else(|e| {
                log::info!("{}; using built-in defaults", e.message());
                Self::default()
            }),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay settings taken from environment variables.
    pub fn apply_env_overrides(&mut self) -> ParkingResult<()> {
        if let Some(key) = env_value("GOOGLE_MAPS_API_KEY") {
            self.maps.api_key = key;
        }
        if let Some(source) = env_value("ZONE_SOURCE") {
            self.zones.source = source;
        }
        if let Some(path) = env_value("ZONES_CSV") {
            self.zones.csv_path = PathBuf::from(path);
        }
        if let Some(workers) = env_value("PARKWISE_WORKERS") {
            self.pipeline.workers = parse_env("PARKWISE_WORKERS", &workers)?;
        }
        if let Some(host) = env_value("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> ParkingResult<()> {
        let invalid = |field: &str, message: &str| {
            ParkingError::configuration_with_context(
                message.to_string(),
                ErrorContext::new("config").with_entity(field),
            )
        };

        if self.pipeline.workers == 0 {
            return Err(invalid("pipeline.workers", "workers must be at least 1"));
        }
        if self.pipeline.call_timeout_ms == 0 {
            return Err(invalid("pipeline.call_timeout_ms", "call timeout must be positive"));
        }
        if self.maps.request_timeout_sec == 0 {
            return Err(invalid("maps.request_timeout_sec", "request timeout must be positive"));
        }
        if self.detection.command_timeout_sec == 0 {
            return Err(invalid(
                "detection.command_timeout_sec",
                "command timeout must be positive",
            ));
        }
        if !KEY_PRECISION_RANGE.contains(&self.zones.key_precision) {
            return Err(invalid(
                "zones.key_precision",
                &format!(
                    "key precision must be between {} and {}",
                    KEY_PRECISION_RANGE.start(),
                    KEY_PRECISION_RANGE.end()
                ),
            ));
        }
        if self.zones.source_type()? == ZoneSourceType::Csv
            && self.zones.csv_path.as_os_str().is_empty()
        {
            return Err(invalid("zones.csv_path", "CSV zone source requires a path"));
        }
        Ok(())
    }

    /// Check the settings needed by the Google maps client.
    pub fn validate_maps(&self) -> ParkingResult<()> {
        if self.maps.api_key.trim().is_empty() {
            return Err(ParkingError::configuration_with_context(
                "maps.api_key (or GOOGLE_MAPS_API_KEY) must be set",
                ErrorContext::new("config").with_entity("maps.api_key"),
            ));
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> ParkingResult<T> {
    value.parse().map_err(|_| {
        ParkingError::configuration_with_context(
            format!("{} has an invalid value: '{}'", name, value),
            ErrorContext::new("config").with_entity(name),
        )
    })
}

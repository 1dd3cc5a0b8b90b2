//! Explicit service wiring.
//!
//! Everything a run needs is gathered once into a [`ServiceContext`] and handed to
//! [`ParkingService`](super::ParkingService); nothing is global.

use std::sync::Arc;

use super::pipeline::ParkingService;
use crate::adapters::{
    AvailabilityService, DetectionAvailability, GeocodingService, GoogleMapsClient,
    ReverseGeocodingService, TravelTimeService,
};
use crate::config::{AppConfig, PipelineConfig};
use crate::db::{
    ZoneRepository, ZoneRepositoryFactory, DEFAULT_KEY_PRECISION, KEY_PRECISION_RANGE,
};
use crate::error::{ParkingError, ParkingResult};
use crate::models::Hour;

/// Collaborators and settings shared by every run.
#[derive(Clone)]
pub struct ServiceContext {
    pub geocoder: Arc<dyn GeocodingService>,
    pub reverse_geocoder: Arc<dyn ReverseGeocodingService>,
    pub travel_time: Arc<dyn TravelTimeService>,
    pub availability: Arc<dyn AvailabilityService>,
    pub zones: Arc<dyn ZoneRepository>,
    pub pipeline: PipelineConfig,
    /// Decimal places used to match zone corners
    pub key_precision: u32,
    pub reload_zones_each_run: bool,
    /// Hour used for stats lookup instead of the local clock
    pub fixed_hour: Option<Hour>,
}

impl ServiceContext {
    /// Hour of day used for this run's stats lookup.
    pub fn current_hour(&self) -> Hour {
        self.fixed_hour.unwrap_or_else(Hour::now)
    }
}

/// Builder for [`ServiceContext`].
///
/// # Example
/// ```ignore
/// let context = ServiceContextBuilder::new()
///     .geocoder(Arc::new(geocoder))
///     .reverse_geocoder(Arc::new(reverse))
///     .travel_time(Arc::new(travel))
///     .availability(Arc::new(availability))
///     .zones(ZoneRepositoryFactory::create_local(rows))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ServiceContextBuilder {
    geocoder: Option<Arc<dyn GeocodingService>>,
    reverse_geocoder: Option<Arc<dyn ReverseGeocodingService>>,
    travel_time: Option<Arc<dyn TravelTimeService>>,
    availability: Option<Arc<dyn AvailabilityService>>,
    zones: Option<Arc<dyn ZoneRepository>>,
    pipeline: PipelineConfig,
    key_precision: Option<u32>,
    reload_zones_each_run: bool,
    fixed_hour: Option<Hour>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn GeocodingService>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn reverse_geocoder(mut self, reverse_geocoder: Arc<dyn ReverseGeocodingService>) -> Self {
        self.reverse_geocoder = Some(reverse_geocoder);
        self
    }

    pub fn travel_time(mut self, travel_time: Arc<dyn TravelTimeService>) -> Self {
        self.travel_time = Some(travel_time);
        self
    }

    pub fn availability(mut self, availability: Arc<dyn AvailabilityService>) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn zones(mut self, zones: Arc<dyn ZoneRepository>) -> Self {
        self.zones = Some(zones);
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn key_precision(mut self, precision: u32) -> Self {
        self.key_precision = Some(precision);
        self
    }

    pub fn reload_zones_each_run(mut self, reload: bool) -> Self {
        self.reload_zones_each_run = reload;
        self
    }

    /// Use `hour` for stats lookup instead of the local clock.
    pub fn fixed_hour(mut self, hour: Hour) -> Self {
        self.fixed_hour = Some(hour);
        self
    }

    /// # Errors
    /// `Configuration` when a collaborator is missing or the pipeline settings are unusable.
    pub fn build(self) -> ParkingResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ParkingResult<T> {
            value.ok_or_else(|| {
                ParkingError::configuration(format!("service context is missing the {}", name))
            })
        }

        if self.pipeline.workers == 0 {
            return Err(ParkingError::configuration("workers must be at least 1"));
        }
        if self.pipeline.call_timeout_ms == 0 {
            return Err(ParkingError::configuration("call timeout must be positive"));
        }
        let key_precision = self.key_precision.unwrap_or(DEFAULT_KEY_PRECISION);
        if !KEY_PRECISION_RANGE.contains(&key_precision) {
            return Err(ParkingError::configuration(format!(
                "key precision must be between {} and {}, got {}",
                KEY_PRECISION_RANGE.start(),
                KEY_PRECISION_RANGE.end(),
                key_precision
            )));
        }

        Ok(ServiceContext {
            geocoder: required(self.geocoder, "geocoder")?,
            reverse_geocoder: required(self.reverse_geocoder, "reverse geocoder")?,
            travel_time: required(self.travel_time, "travel time service")?,
            availability: required(self.availability, "availability service")?,
            zones: required(self.zones, "zone source")?,
            pipeline: self.pipeline,
            key_precision,
            reload_zones_each_run: self.reload_zones_each_run,
            fixed_hour: self.fixed_hour,
        })
    }
}

/// Creates production services from configuration.
pub struct ServiceFactory;

impl ServiceFactory {
    /// Wire the Google maps client, label-file detection and the configured zone source.
    pub fn context_from_config(config: &AppConfig) -> ParkingResult<ServiceContext> {
        config.validate()?;
        config.validate_maps()?;

        let maps = Arc::new(GoogleMapsClient::new(&config.maps)?);
        ServiceContextBuilder::new()
            .geocoder(maps.clone())
            .reverse_geocoder(maps.clone())
            .travel_time(maps)
            .availability(Arc::new(DetectionAvailability::new(config.detection.clone())))
            .zones(ZoneRepositoryFactory::from_config(&config.zones)?)
            .pipeline(config.pipeline.clone())
            .key_precision(config.zones.key_precision)
            .reload_zones_each_run(config.zones.reload_each_run)
            .build()
    }

    /// Build a ready [`ParkingService`] (zone index loaded) from configuration.
    pub async fn from_config(config: &AppConfig) -> ParkingResult<ParkingService> {
        let context = Self::context_from_config(config)?;
        ParkingService::new(context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedAvailability, FixedGeocoder, FixedReverseGeocoder, FixedTravelTime};

    #[test]
    fn test_builder_requires_collaborators() {
        let err = ServiceContextBuilder::new()
            .geocoder(Arc::new(FixedGeocoder::new()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ParkingError::Configuration { .. }));
        assert!(err.to_string().contains("reverse geocoder"));
    }

    #[test]
    fn test_builder_complete() {
        let context = ServiceContextBuilder::new()
            .geocoder(Arc::new(FixedGeocoder::new()))
            .reverse_geocoder(Arc::new(FixedReverseGeocoder::new()))
            .travel_time(Arc::new(FixedTravelTime::new()))
            .availability(Arc::new(FixedAvailability::new()))
            .zones(ZoneRepositoryFactory::create_local(Vec::new()))
            .fixed_hour(Hour::new(8).unwrap())
            .build()
            .unwrap();
        assert_eq!(context.key_precision, DEFAULT_KEY_PRECISION);
        assert_eq!(context.current_hour(), Hour::new(8).unwrap());
    }

    #[test]
    fn test_factory_requires_api_key() {
        let mut config = AppConfig::default();
        config.zones.source = "local".into();
        let err = ServiceFactory::context_from_config(&config).err().unwrap();
        assert!(matches!(err, ParkingError::Configuration { .. }));

        config.maps.api_key = "test-key".into();
        assert!(ServiceFactory::context_from_config(&config).is_ok());
    }
}

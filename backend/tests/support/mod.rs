#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use parkwise::adapters::{FixedAvailability, FixedGeocoder, FixedReverseGeocoder, FixedTravelTime};
use parkwise::config::PipelineConfig;
use parkwise::db::ZoneRepositoryFactory;
use parkwise::models::{Hour, Location, ZoneRow};
use parkwise::services::ServiceContextBuilder;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Degrees of latitude per kilometer on the haversine sphere.
pub const DEGREES_PER_KM: f64 = 1.0 / 111.194_926_644_558_73;

pub const DESTINATION_ADDRESS: &str = "1151 Centre Street SE, Calgary";
pub const NEAR_ADDRESS: &str = "200 Near Ave SE";
pub const MID_ADDRESS: &str = "400 Middle Rd SE";
pub const FAR_ADDRESS: &str = "900 Far Blvd SE";

pub fn km_north(from: Location, km: f64) -> Location {
    Location::new(from.latitude() + km * DEGREES_PER_KM, from.longitude())
}

pub fn km_south(from: Location, km: f64) -> Location {
    km_north(from, -km)
}

/// Destination with three zones due north of it at 0.4, 0.8 and 1.2 km.
#[derive(Debug, Clone, Copy)]
pub struct Calgary {
    pub destination: Location,
    pub near: Location,
    pub mid: Location,
    pub far: Location,
}

impl Calgary {
    pub fn new() -> Self {
        let destination = Location::new(51.05, -114.07);
        Self {
            destination,
            near: km_north(destination, 0.4),
            mid: km_north(destination, 0.8),
            far: km_north(destination, 1.2),
        }
    }

    pub fn hour() -> Hour {
        Hour::new(8).unwrap()
    }

    /// Zone rows in source order: near, mid, far.
    pub fn zone_rows(&self) -> Vec<ZoneRow> {
        vec![
            row(self.near, 10.0, r#"{"8": 0.1, "17": 0.9}"#),
            row(self.mid, 10.0, r#"{"8": 0.2}"#),
            row(self.far, 5.0, r#"{"8": 0.0}"#),
        ]
    }

    pub fn geocoder(&self) -> FixedGeocoder {
        FixedGeocoder::new().with_place(DESTINATION_ADDRESS, self.destination)
    }

    pub fn reverse_geocoder(&self) -> FixedReverseGeocoder {
        FixedReverseGeocoder::new()
            .with_address(self.near, NEAR_ADDRESS)
            .with_address(self.mid, MID_ADDRESS)
            .with_address(self.far, FAR_ADDRESS)
    }

    /// Near: 3 slots. Mid: 5 slots. Far: plenty, but out of range.
    pub fn availability(&self) -> FixedAvailability {
        FixedAvailability::new()
            .with_slots(self.near, 3)
            .with_slots(self.mid, 5)
            .with_slots(self.far, 40)
    }

    /// Near grades 12.3 and mid grades 15.8 with these routes.
    pub fn travel_time(&self) -> FixedTravelTime {
        FixedTravelTime::new()
            .with_route(DESTINATION_ADDRESS, NEAR_ADDRESS, 29.5)
            .with_route(DESTINATION_ADDRESS, MID_ADDRESS, 15.0)
            .with_route(DESTINATION_ADDRESS, FAR_ADDRESS, 1.0)
    }

    /// Builder wired with the default fixed adapters.
    pub fn builder(&self) -> ServiceContextBuilder {
        self.builder_with(
            Arc::new(self.geocoder()),
            Arc::new(self.availability()),
            Arc::new(self.travel_time()),
        )
    }

    pub fn builder_with(
        &self,
        geocoder: Arc<FixedGeocoder>,
        availability: Arc<FixedAvailability>,
        travel_time: Arc<FixedTravelTime>,
    ) -> ServiceContextBuilder {
        ServiceContextBuilder::new()
            .geocoder(geocoder)
            .reverse_geocoder(Arc::new(self.reverse_geocoder()))
            .travel_time(travel_time)
            .availability(availability)
            .zones(ZoneRepositoryFactory::create_local(self.zone_rows()))
            .pipeline(fast_pipeline())
            .fixed_hour(Self::hour())
    }
}

pub fn row(corner: Location, avg_time_to_park: f64, searching_by_hour: &str) -> ZoneRow {
    ZoneRow::from_values(
        corner.latitude(),
        corner.longitude(),
        avg_time_to_park,
        searching_by_hour,
    )
}

/// Short timeouts and backoff so failure paths stay quick.
pub fn fast_pipeline() -> PipelineConfig {
    PipelineConfig {
        workers: 4,
        call_timeout_ms: 500,
        max_retries: 3,
        retry_delay_ms: 1,
    }
}

//! In-memory adapters with scripted answers.
//!
//! Each adapter answers from a table filled in by the caller and can be told to respond
//! slowly or to fail a number of times with a retryable transport error before answering.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use super::{AvailabilityService, GeocodingService, ReverseGeocodingService, TravelTimeService};
use crate::error::{ParkingError, ParkingResult};
use crate::models::{CandidateId, Location};

/// Call counting, latency and transient failures shared by the fixed adapters.
#[derive(Debug, Default)]
struct Script {
    delay: Option<Duration>,
    transient_failures: u32,
    calls: usize,
}

#[derive(Debug, Default)]
struct Scripted(Mutex<Script>);

impl Scripted {
    async fn call(&self, what: &str) -> ParkingResult<()> {
        let (delay, fail) = {
            let mut script = self.0.lock();
            script.calls += 1;
            let fail = script.transient_failures > 0;
            if fail {
                script.transient_failures -= 1;
            }
            (script.delay, fail)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(ParkingError::transport(format!("scripted failure in {}", what)));
        }
        Ok(())
    }

    fn calls(&self) -> usize {
        self.0.lock().calls
    }

    fn set_delay(&self, delay: Duration) {
        self.0.lock().delay = Some(delay);
    }

    fn set_transient_failures(&self, count: u32) {
        self.0.lock().transient_failures = count;
    }
}

/// Geocoder answering from an address table.
#[derive(Debug, Default)]
pub struct FixedGeocoder {
    places: HashMap<String, Location>,
    script: Scripted,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, address: impl Into<String>, location: Location) -> Self {
        self.places.insert(address.into(), location);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.set_delay(delay);
        self
    }

    /// Fail the next `count` calls with a retryable transport error.
    pub fn with_transient_failures(self, count: u32) -> Self {
        self.script.set_transient_failures(count);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl GeocodingService for FixedGeocoder {
    async fn resolve(&self, address: &str) -> ParkingResult<Location> {
        self.script.call("geocode").await?;
        self.places
            .get(address.trim())
            .copied()
            .ok_or_else(|| ParkingError::address_not_found(address))
    }
}

/// Reverse geocoder answering from a table keyed by coordinates.
#[derive(Debug, Default)]
pub struct FixedReverseGeocoder {
    addresses: HashMap<CandidateId, String>,
    script: Scripted,
}

impl FixedReverseGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, location: Location, address: impl Into<String>) -> Self {
        self.addresses
            .insert(CandidateId::from_location(&location), address.into());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.set_delay(delay);
        self
    }

    pub fn with_transient_failures(self, count: u32) -> Self {
        self.script.set_transient_failures(count);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl ReverseGeocodingService for FixedReverseGeocoder {
    async fn resolve(&self, location: Location) -> ParkingResult<String> {
        self.script.call("reverse_geocode").await?;
        self.addresses
            .get(&CandidateId::from_location(&location))
            .cloned()
            .ok_or_else(|| ParkingError::no_address_for_location(location))
    }
}

/// Travel times per `(origin, destination)` pair with an optional fallback.
#[derive(Debug, Default)]
pub struct FixedTravelTime {
    routes: HashMap<(String, String), f64>,
    default_minutes: Option<f64>,
    script: Scripted,
}

impl FixedTravelTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(
        mut self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        minutes: f64,
    ) -> Self {
        self.routes.insert((origin.into(), destination.into()), minutes);
        self
    }

    /// Minutes returned for pairs without an explicit route.
    pub fn with_default(mut self, minutes: f64) -> Self {
        self.default_minutes = Some(minutes);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.set_delay(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl TravelTimeService for FixedTravelTime {
    async fn estimate(&self, origin: &str, destination: &str) -> ParkingResult<f64> {
        self.script.call("travel_time").await?;
        self.routes
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
            .or(self.default_minutes)
            .ok_or_else(|| {
                ParkingError::route_unavailable(format!(
                    "no route from '{}' to '{}'",
                    origin, destination
                ))
            })
    }
}

/// Slot counts per candidate, with optional per-candidate latency.
#[derive(Debug, Default)]
pub struct FixedAvailability {
    slots: HashMap<CandidateId, u32>,
    delays: HashMap<CandidateId, Duration>,
    fail_prepare: bool,
    prepared: Mutex<Vec<Vec<CandidateId>>>,
    script: Scripted,
}

impl FixedAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(mut self, location: Location, slots: u32) -> Self {
        self.slots.insert(CandidateId::from_location(&location), slots);
        self
    }

    /// Delay the answer for one candidate only.
    pub fn with_delay_for(mut self, location: Location, delay: Duration) -> Self {
        self.delays.insert(CandidateId::from_location(&location), delay);
        self
    }

    /// Make every `prepare` call fail.
    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    /// Candidate lists passed to `prepare`, one entry per run.
    pub fn prepared_runs(&self) -> Vec<Vec<CandidateId>> {
        self.prepared.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.script.calls()
    }
}

#[async_trait]
impl AvailabilityService for FixedAvailability {
    async fn prepare(&self, candidates: &[CandidateId]) -> ParkingResult<()> {
        self.prepared.lock().push(candidates.to_vec());
        if self.fail_prepare {
            return Err(ParkingError::internal("scripted detector failure")
                .with_operation("run_detector"));
        }
        Ok(())
    }

    async fn detect(&self, candidate: &CandidateId) -> ParkingResult<u32> {
        self.script.call("detect").await?;
        if let Some(delay) = self.delays.get(candidate) {
            tokio::time::sleep(*delay).await;
        }
        self.slots.get(candidate).copied().ok_or_else(|| {
            ParkingError::detection_unavailable(candidate, "no detection result")
        })
    }
}

//! External collaborators of the pipeline.
//!
//! Each collaborator is an async trait so the pipeline can run against real services,
//! a detection process on disk, or the in-memory doubles in [`fixed`].
//!
//! - [`google`]: geocoding, reverse geocoding and travel time over the Google Maps web API
//! - [`detection`]: slot counts read from object-detection label files
//! - [`fixed`]: in-memory implementations for tests and local development

use async_trait::async_trait;

use crate::error::ParkingResult;
use crate::models::{CandidateId, Location};

pub mod detection;
pub mod fixed;
pub mod google;

pub use detection::DetectionAvailability;
pub use fixed::{FixedAvailability, FixedGeocoder, FixedReverseGeocoder, FixedTravelTime};
pub use google::GoogleMapsClient;

/// Address to coordinates.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// # Errors
    /// `AddressNotFound` when the address cannot be resolved.
    async fn resolve(&self, address: &str) -> ParkingResult<Location>;
}

/// Coordinates to a human readable address.
#[async_trait]
pub trait ReverseGeocodingService: Send + Sync {
    /// # Errors
    /// `NoAddressForLocation` when nothing is known at `location`.
    async fn resolve(&self, location: Location) -> ParkingResult<String>;
}

/// Driving time between two addresses.
#[async_trait]
pub trait TravelTimeService: Send + Sync {
    /// Estimated minutes from `origin` to `destination`.
    ///
    /// # Errors
    /// `RouteUnavailable` when no route exists.
    async fn estimate(&self, origin: &str, destination: &str) -> ParkingResult<f64>;
}

/// Count of currently empty slots in a zone.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Called once per run with every candidate before any `detect` call.
    async fn prepare(&self, _candidates: &[CandidateId]) -> ParkingResult<()> {
        Ok(())
    }

    /// # Errors
    /// `DetectionUnavailable` when no detection result exists for `candidate`.
    async fn detect(&self, candidate: &CandidateId) -> ParkingResult<u32>;
}

//! Public API surface.
//!
//! Consolidates the types most callers need: configuration, the service and its
//! builder, the collaborator traits and the result types.

pub use crate::adapters::{
    AvailabilityService, GeocodingService, ReverseGeocodingService, TravelTimeService,
};
pub use crate::config::AppConfig;
pub use crate::error::{ErrorContext, ParkingError, ParkingResult};
pub use crate::models::{Candidate, CandidateId, Hour, Location, ParkingZoneRecord, ZoneRow};
pub use crate::services::{
    Outcome, ParkingService, Recommendation, Reply, ServiceContextBuilder, ServiceFactory,
};
pub use tokio_util::sync::CancellationToken;

//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::ParkingService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Recommendation service shared by every request
    pub service: Arc<ParkingService>,
}

impl AppState {
    /// Create a new application state around a ready service.
    pub fn new(service: Arc<ParkingService>) -> Self {
        Self { service }
    }
}

//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ParkingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Pipeline error
    Parking(ParkingError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Parking(e) => {
                let (status, code) = match &e {
                    ParkingError::AddressNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "ADDRESS_NOT_FOUND")
                    }
                    ParkingError::NoSuitableParkingFound { .. } => {
                        (StatusCode::NOT_FOUND, "NO_SUITABLE_PARKING")
                    }
                    ParkingError::Cancelled { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED")
                    }
                    ParkingError::Configuration { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                    }
                    ParkingError::NoAddressForLocation { .. }
                    | ParkingError::RouteUnavailable { .. }
                    | ParkingError::DetectionUnavailable { .. }
                    | ParkingError::Timeout { .. }
                    | ParkingError::Transport { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                    ParkingError::MalformedRecord { .. }
                    | ParkingError::StatsNotFound { .. }
                    | ParkingError::Internal { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };
                let body = ApiError::new(code, e.message()).with_details(e.context().to_string());
                (status, body)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        (status, Json(error)).into_response()
    }
}

impl From<ParkingError> for AppError {
    fn from(err: ParkingError) -> Self {
        AppError::Parking(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ParkingError) -> (StatusCode, String) {
        let (status, body) = AppError::from(err).status_and_body();
        (status, body.code)
    }

    #[test]
    fn test_parking_error_status_mapping() {
        assert_eq!(
            status_of(ParkingError::address_not_found("x")),
            (StatusCode::NOT_FOUND, "ADDRESS_NOT_FOUND".to_string())
        );
        assert_eq!(
            status_of(ParkingError::no_suitable_parking("none")),
            (StatusCode::NOT_FOUND, "NO_SUITABLE_PARKING".to_string())
        );
        assert_eq!(
            status_of(ParkingError::cancelled("stop")).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ParkingError::transport("down")).0,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ParkingError::configuration("bad")).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_carry_context() {
        let (_, body) = AppError::from(ParkingError::address_not_found("Main St")).status_and_body();
        assert!(body.details.unwrap().contains("operation=geocode"));
    }
}

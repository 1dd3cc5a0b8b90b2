//! Google Maps web API client (geocoding and directions).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{GeocodingService, ReverseGeocodingService, TravelTimeService};
use crate::config::MapsConfig;
use crate::error::{ErrorContext, ParkingError, ParkingResult};
use crate::models::Location;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const STATUS_NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    duration: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    /// Seconds
    value: f64,
}

/// Client for the geocoding and directions endpoints.
///
/// Travel time is the duration of the first leg of the first route, in minutes.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleMapsClient {
    /// Build a client from the `[maps]` configuration section.
    pub fn new(config: &MapsConfig) -> ParkingResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                ParkingError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Coordinates of the first result for `address`.
    pub async fn geocode(&self, address: &str) -> ParkingResult<Location> {
        let response: GeocodeResponse = self
            .get_json("geocode/json", &[("address", address)], "geocode")
            .await?;

        match response.status.as_str() {
            STATUS_OK => response
                .results
                .first()
                .map(|r| Location::new(r.geometry.location.lat, r.geometry.location.lng))
                .ok_or_else(|| ParkingError::address_not_found(address)),
            STATUS_ZERO_RESULTS => Err(ParkingError::address_not_found(address)),
            other => Err(status_error(
                "geocode",
                other,
                response.error_message.as_deref(),
            )),
        }
    }

    /// Formatted address of the first result at `location`.
    pub async fn reverse_geocode(&self, location: Location) -> ParkingResult<String> {
        let latlng = format!("{},{}", location.latitude(), location.longitude());
        let response: GeocodeResponse = self
            .get_json("geocode/json", &[("latlng", latlng.as_str())], "reverse_geocode")
            .await?;

        match response.status.as_str() {
            STATUS_OK => response
                .results
                .into_iter()
                .next()
                .map(|r| r.formatted_address)
                .ok_or_else(|| ParkingError::no_address_for_location(location)),
            STATUS_ZERO_RESULTS => Err(ParkingError::no_address_for_location(location)),
            other => Err(status_error(
                "reverse_geocode",
                other,
                response.error_message.as_deref(),
            )),
        }
    }

    /// Driving minutes from `origin` to `destination`.
    pub async fn travel_time(&self, origin: &str, destination: &str) -> ParkingResult<f64> {
        let response: DirectionsResponse = self
            .get_json(
                "directions/json",
                &[("origin", origin), ("destination", destination)],
                "travel_time",
            )
            .await?;

        match response.status.as_str() {
            STATUS_OK => response
                .routes
                .first()
                .and_then(|route| route.legs.first())
                .map(|leg| leg.duration.value / 60.0)
                .ok_or_else(|| {
                    ParkingError::route_unavailable(format!(
                        "no route legs from '{}' to '{}'",
                        origin, destination
                    ))
                }),
            STATUS_ZERO_RESULTS | STATUS_NOT_FOUND => Err(ParkingError::route_unavailable(
                format!("no route from '{}' to '{}'", origin, destination),
            )),
            other => Err(status_error(
                "travel_time",
                other,
                response.error_message.as_deref(),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        operation: &str,
    ) -> ParkingResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {} ({})", url, operation);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ParkingError::from(e).with_operation(operation))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ParkingError::transport_with_context(
                format!("maps API answered {}", status),
                ErrorContext::new(operation).with_entity("maps_api"),
            ));
        }
        if !status.is_success() {
            return Err(ParkingError::internal_with_context(
                format!("maps API answered {}", status),
                ErrorContext::new(operation).with_entity("maps_api"),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ParkingError::from(e).with_operation(operation))
    }
}

/// Error for an API-level status other than success or "no results".
fn status_error(operation: &str, status: &str, message: Option<&str>) -> ParkingError {
    let context = ErrorContext::new(operation)
        .with_entity("maps_api")
        .with_details(message.unwrap_or(status));
    match status {
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => ParkingError::transport_with_context(
            format!("maps API status {}", status),
            context,
        ),
        "REQUEST_DENIED" => ParkingError::configuration_with_context(
            format!("maps API status {}", status),
            context,
        ),
        _ => ParkingError::internal_with_context(format!("maps API status {}", status), context),
    }
}

#[async_trait]
impl GeocodingService for GoogleMapsClient {
    async fn resolve(&self, address: &str) -> ParkingResult<Location> {
        self.geocode(address).await
    }
}

#[async_trait]
impl ReverseGeocodingService for GoogleMapsClient {
    async fn resolve(&self, location: Location) -> ParkingResult<String> {
        self.reverse_geocode(location).await
    }
}

#[async_trait]
impl TravelTimeService for GoogleMapsClient {
    async fn estimate(&self, origin: &str, destination: &str) -> ParkingResult<f64> {
        self.travel_time(origin, destination).await
    }
}

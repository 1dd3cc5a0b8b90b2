//! Error types for the parking recommendation pipeline.
//!
//! Every failure the pipeline can observe is a [`ParkingError`] variant carrying a
//! human-readable message plus an [`ErrorContext`] describing where it happened.
//! Whether an error aborts a run or only degrades a single candidate is decided by the
//! caller (see `services::pipeline`), not by the error itself.

use std::fmt;

/// Result type for pipeline and adapter operations
pub type ParkingResult<T> = Result<T, ParkingError>;

/// Structured context for pipeline errors.
///
/// Provides additional information about where and why an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "geocode", "detect", "load_zones")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "address", "candidate", "zone_row")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for the parking pipeline and its adapters
#[derive(Debug, thiserror::Error)]
pub enum ParkingError {
    /// A zone source row could not be parsed. Skipped and logged, never fatal.
    #[error("Malformed record: {message} {context}")]
    MalformedRecord {
        message: String,
        context: ErrorContext,
    },

    /// The destination address could not be geocoded. Fatal to the run.
    #[error("Address not found: {message} {context}")]
    AddressNotFound {
        message: String,
        context: ErrorContext,
    },

    /// A location has no address. Fatal when it concerns the winning candidate.
    #[error("No address for location: {message} {context}")]
    NoAddressForLocation {
        message: String,
        context: ErrorContext,
    },

    /// No route between two addresses. Degrades the affected candidate.
    #[error("Route unavailable: {message} {context}")]
    RouteUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// Slot detection failed for a candidate. Degrades the affected candidate.
    #[error("Detection unavailable: {message} {context}")]
    DetectionUnavailable {
        message: String,
        context: ErrorContext,
    },

    /// No historical record for a zone. The no-stats grading branch is used instead.
    #[error("Stats not found: {message} {context}")]
    StatsNotFound {
        message: String,
        context: ErrorContext,
    },

    /// The run completed but no candidate graded above zero.
    #[error("No suitable parking found: {message} {context}")]
    NoSuitableParkingFound {
        message: String,
        context: ErrorContext,
    },

    /// An external call did not answer in time.
    #[error("Timeout error: {message} {context}")]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    /// Network or upstream service failure.
    #[error("Transport error: {message} {context}")]
    Transport {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// The run was cancelled by the caller.
    #[error("Cancelled: {message} {context}")]
    Cancelled {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl ParkingError {
    /// Create a malformed record error for a source row.
    pub fn malformed_record(row: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
            context: ErrorContext::new("parse_zone_row")
                .with_entity("zone_row")
                .with_entity_id(row),
        }
    }

    /// Create an address not found error.
    pub fn address_not_found(address: impl Into<String>) -> Self {
        let address = address.into();
        Self::AddressNotFound {
            message: format!("no geocoding result for '{}'", address),
            context: ErrorContext::new("geocode")
                .with_entity("address")
                .with_entity_id(address),
        }
    }

    /// Create a no-address-for-location error.
    pub fn no_address_for_location(location: impl fmt::Display) -> Self {
        Self::NoAddressForLocation {
            message: format!("no reverse geocoding result for {}", location),
            context: ErrorContext::new("reverse_geocode").with_entity("location"),
        }
    }

    /// Create a route unavailable error.
    pub fn route_unavailable(message: impl Into<String>) -> Self {
        Self::RouteUnavailable {
            message: message.into(),
            context: ErrorContext::new("travel_time"),
        }
    }

    /// Create a detection unavailable error for a candidate.
    pub fn detection_unavailable(candidate: impl ToString, message: impl Into<String>) -> Self {
        Self::DetectionUnavailable {
            message: message.into(),
            context: ErrorContext::new("detect")
                .with_entity("candidate")
                .with_entity_id(candidate),
        }
    }

    /// Create a stats not found error for a zone.
    pub fn stats_not_found(zone: impl fmt::Display) -> Self {
        Self::StatsNotFound {
            message: format!("no zone record at {}", zone),
            context: ErrorContext::new("stats_lookup").with_entity("zone"),
        }
    }

    /// Create the terminal "nothing good enough" outcome.
    pub fn no_suitable_parking(message: impl Into<String>) -> Self {
        Self::NoSuitableParkingFound {
            message: message.into(),
            context: ErrorContext::new("select"),
        }
    }

    /// Create a timeout error. Timeouts are retryable.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a transport error. Transport errors are retryable.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    /// Create a transport error with full context.
    pub fn transport_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Transport {
            message: message.into(),
            context: context.retryable(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error with context.
    pub fn configuration_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Configuration {
            message: message.into(),
            context,
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create an internal error with context.
    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Internal {
            message: message.into(),
            context,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { context, .. } => context.retryable,
            Self::Transport { context, .. } => context.retryable,
            _ => false,
        }
    }

    /// Get the human-readable message without the context suffix.
    pub fn message(&self) -> &str {
        match self {
            Self::MalformedRecord { message, .. }
            | Self::AddressNotFound { message, .. }
            | Self::NoAddressForLocation { message, .. }
            | Self::RouteUnavailable { message, .. }
            | Self::DetectionUnavailable { message, .. }
            | Self::StatsNotFound { message, .. }
            | Self::NoSuitableParkingFound { message, .. }
            | Self::Timeout { message, .. }
            | Self::Transport { message, .. }
            | Self::Configuration { message, .. }
            | Self::Cancelled { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::MalformedRecord { context, .. }
            | Self::AddressNotFound { context, .. }
            | Self::NoAddressForLocation { context, .. }
            | Self::RouteUnavailable { context, .. }
            | Self::DetectionUnavailable { context, .. }
            | Self::StatsNotFound { context, .. }
            | Self::NoSuitableParkingFound { context, .. }
            | Self::Timeout { context, .. }
            | Self::Transport { context, .. }
            | Self::Configuration { context, .. }
            | Self::Cancelled { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::MalformedRecord { context, .. }
            | Self::AddressNotFound { context, .. }
            | Self::NoAddressForLocation { context, .. }
            | Self::RouteUnavailable { context, .. }
            | Self::DetectionUnavailable { context, .. }
            | Self::StatsNotFound { context, .. }
            | Self::NoSuitableParkingFound { context, .. }
            | Self::Timeout { context, .. }
            | Self::Transport { context, .. }
            | Self::Configuration { context, .. }
            | Self::Cancelled { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Attach the entity the error concerns.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.context_mut().entity_id = Some(id.to_string());
        self
    }
}

impl From<reqwest::Error> for ParkingError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::new("http_request").with_details(
            err.url()
                .map(|u| u.path().to_string())
                .unwrap_or_else(|| "<no url>".to_string()),
        );
        if err.is_timeout() {
            ParkingError::Timeout {
                message: err.to_string(),
                context: context.retryable(),
            }
        } else if err.is_decode() {
            // A malformed body will not improve on retry
            ParkingError::internal_with_context(err.to_string(), context)
        } else {
            ParkingError::transport_with_context(err.to_string(), context)
        }
    }
}

impl From<std::io::Error> for ParkingError {
    fn from(err: std::io::Error) -> Self {
        ParkingError::internal_with_context(err.to_string(), ErrorContext::new("io"))
    }
}

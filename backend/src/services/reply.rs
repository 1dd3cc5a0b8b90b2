//! User-facing text for a run's outcome.

use serde::{Deserialize, Serialize};

use crate::error::ParkingError;

/// How a request ended, so front ends can tell failure text from an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Found,
    NotFound,
    Failed,
}

/// Result of `submit`: an outcome plus the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub outcome: Outcome,
    pub text: String,
}

impl Reply {
    /// Reply naming the recommended parking address.
    pub fn found(address: &str) -> Self {
        Self {
            outcome: Outcome::Found,
            text: format!("The best parking for you is available in {}", address),
        }
    }

    /// Reply for a failed run.
    pub fn from_error(err: &ParkingError) -> Self {
        match err {
            ParkingError::AddressNotFound { context, .. } => Self {
                outcome: Outcome::NotFound,
                text: match context.entity_id.as_deref() {
                    Some(address) => format!(
                        "Could not find the address '{}'. Please check it and try again.",
                        address
                    ),
                    None => "Could not find that address. Please check it and try again."
                        .to_string(),
                },
            },
            ParkingError::NoSuitableParkingFound { .. } => Self {
                outcome: Outcome::NotFound,
                text: "No available parking was found near your destination.".to_string(),
            },
            ParkingError::Cancelled { .. } => Self {
                outcome: Outcome::Failed,
                text: "The request was cancelled.".to_string(),
            },
            _ => Self {
                outcome: Outcome::Failed,
                text: "Something went wrong while looking for parking. Please try again later."
                    .to_string(),
            },
        }
    }

    pub fn is_found(&self) -> bool {
        self.outcome == Outcome::Found
    }
}

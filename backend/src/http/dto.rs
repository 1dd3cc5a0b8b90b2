//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

pub use crate::services::{Outcome, Recommendation};

/// Request body for `POST /v1/recommendations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Destination address
    pub address: String,
}

/// Incoming chat message for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation the message belongs to, echoed back in the reply
    pub chat_id: i64,
    /// Raw message text
    pub text: String,
}

/// Reply to a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_id: i64,
    pub text: String,
    /// Absent for help and usage replies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Zone source status
    pub zone_source: String,
    /// Zones currently indexed
    pub zones: usize,
}

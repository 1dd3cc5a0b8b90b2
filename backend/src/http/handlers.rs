//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! [`ParkingService`](crate::services::ParkingService).

use axum::{extract::State, Json};
use tokio_util::sync::CancellationToken;

use super::dto::{ChatRequest, ChatResponse, HealthResponse, Recommendation, RecommendationRequest};
use super::error::AppError;
use super::state::AppState;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Text returned for `/start`, `/help` and malformed commands.
pub const USAGE_TEXT: &str = "Send me a destination address and I will find the best parking \
near it.\nExamples:\n  /park 1151 Centre Street SE, Calgary\n  263 McLeod Street, Ottawa";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the zone source is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let zone_source = match state.service.health_check().await {
        Ok(true) => "available".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        zone_source,
        zones: state.service.zone_count(),
    }))
}

// =============================================================================
// Recommendations
// =============================================================================

/// POST /v1/recommendations
///
/// Run the pipeline for a destination address and return the full recommendation.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> HandlerResult<Recommendation> {
    if request.address.trim().is_empty() {
        return Err(AppError::BadRequest("address must not be empty".to_string()));
    }

    // Dropping the request (client disconnect) drops the run and cancels its tasks.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let recommendation = state.service.recommend(&request.address, &cancel).await?;
    Ok(Json(recommendation))
}

// =============================================================================
// Chat commands
// =============================================================================

/// A parsed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Park(String),
}

impl ChatCommand {
    /// Parse a chat message.
    ///
    /// `/start` and `/help` ask for usage; `/park <address>` and any text not starting
    /// with `/` request parking. Unknown commands and `/park` without an address fall
    /// back to usage.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(command_line) = text.strip_prefix('/') else {
            return if text.is_empty() {
                Self::Help
            } else {
                Self::Park(text.to_string())
            };
        };

        let (command, rest) = command_line
            .split_once(char::is_whitespace)
            .unwrap_or((command_line, ""));
        // Group chats address commands as `/park@botname`
        let command = command.split('@').next().unwrap_or(command);
        let rest = rest.trim();

        match command.to_lowercase().as_str() {
            "park" if !rest.is_empty() => Self::Park(rest.to_string()),
            _ => Self::Help,
        }
    }
}

/// POST /v1/chat
///
/// Chat front end: answers commands and turns addresses into recommendations.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> HandlerResult<ChatResponse> {
    let response = match ChatCommand::parse(&request.text) {
        ChatCommand::Help => ChatResponse {
            chat_id: request.chat_id,
            text: USAGE_TEXT.to_string(),
            outcome: None,
        },
        ChatCommand::Park(address) => {
            tracing::info!(chat_id = request.chat_id, "Chat parking request");
            let reply = state.service.submit(&address).await;
            ChatResponse {
                chat_id: request.chat_id,
                text: reply.text,
                outcome: Some(reply.outcome),
            }
        }
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_commands() {
        assert_eq!(ChatCommand::parse("/start"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("/help"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("   "), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("/park"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("/weather Calgary"), ChatCommand::Help);
        assert_eq!(
            ChatCommand::parse("/park  1 Main St "),
            ChatCommand::Park("1 Main St".to_string())
        );
        assert_eq!(
            ChatCommand::parse("/PARK@parkwise_bot 1 Main St"),
            ChatCommand::Park("1 Main St".to_string())
        );
        assert_eq!(
            ChatCommand::parse("263 McLeod Street, Ottawa"),
            ChatCommand::Park("263 McLeod Street, Ottawa".to_string())
        );
    }
}

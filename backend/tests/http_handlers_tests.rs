//! REST and chat endpoints driven through the router.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use parkwise::http::handlers::USAGE_TEXT;
use parkwise::http::{create_router, AppState};
use parkwise::services::ParkingService;
use support::{Calgary, DESTINATION_ADDRESS, MID_ADDRESS};

async fn app() -> Router {
    let context = Calgary::new().builder().build().unwrap();
    let service = ParkingService::new(context).await.unwrap();
    create_router(AppState::new(Arc::new(service)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_zone_count() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app().await, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["zone_source"], "available");
    assert_eq!(body["zones"], 3);
}

#[tokio::test]
async fn test_recommendation_endpoint() {
    let (status, body) = send(
        app().await,
        post_json("/v1/recommendations", json!({ "address": DESTINATION_ADDRESS })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["best_address"], MID_ADDRESS);
    assert_eq!(body["destination_address"], DESTINATION_ADDRESS);
    assert_eq!(body["candidates"].as_array().unwrap().len(), 2);
    assert_eq!(body["best"]["available_slots"], 5);
}

#[tokio::test]
async fn test_recommendation_unknown_address() {
    let (status, body) = send(
        app().await,
        post_json("/v1/recommendations", json!({ "address": "Atlantis" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ADDRESS_NOT_FOUND");
}

#[tokio::test]
async fn test_recommendation_rejects_blank_address() {
    let (status, body) = send(
        app().await,
        post_json("/v1/recommendations", json!({ "address": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_recommendation_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/recommendations")
        .header("content-type", "application/json")
        .body(Body::from("{\"addr\": 1}"))
        .unwrap();
    let (status, _) = send(app().await, request).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_chat_park_command() {
    let (status, body) = send(
        app().await,
        post_json(
            "/v1/chat",
            json!({ "chat_id": 42, "text": format!("/park {}", DESTINATION_ADDRESS) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_id"], 42);
    assert_eq!(body["outcome"], "found");
    assert_eq!(
        body["text"],
        format!("The best parking for you is available in {}", MID_ADDRESS)
    );
}

#[tokio::test]
async fn test_chat_plain_text_is_an_address() {
    let (status, body) = send(
        app().await,
        post_json("/v1/chat", json!({ "chat_id": -7, "text": "Atlantis" })),
    )
    .await;

    // Failures are conversational replies, not HTTP errors.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_id"], -7);
    assert_eq!(body["outcome"], "not_found");
    assert!(body["text"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn test_chat_help_has_no_outcome() {
    for text in ["/start", "/help", "/park", "/weather Calgary"] {
        let (status, body) = send(
            app().await,
            post_json("/v1/chat", json!({ "chat_id": 1, "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], USAGE_TEXT);
        assert!(body.get("outcome").is_none(), "unexpected outcome for {}", text);
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/v1/unknown")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app().await, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

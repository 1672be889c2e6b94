#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use itinerary_service::config::{
    GeminiSettings, ItineraryConfig, ObservabilitySettings, SessionSettings,
};
use itinerary_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use itinerary_service::services::providers::TextProvider;
use itinerary_service::{build_router, AppState};
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-1.5-flash";
pub const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

pub fn test_config(api_key: Option<&str>, api_base: &str) -> ItineraryConfig {
    ItineraryConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        gemini: GeminiSettings {
            api_key: api_key.map(|key| Secret::new(key.to_string())),
            api_base: api_base.to_string(),
            model: TEST_MODEL.to_string(),
            timeout_secs: 5,
        },
        session: SessionSettings {
            secure_cookie: false,
        },
        observability: ObservabilitySettings {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Router wired to a real Gemini provider pointed at `api_base`.
pub fn gemini_router(api_key: Option<&str>, api_base: &str) -> Router {
    let config = test_config(api_key, api_base);
    let provider = GeminiTextProvider::new(GeminiConfig::from(&config.gemini))
        .expect("Failed to create Gemini provider");
    build_router(AppState::new(config, Arc::new(provider)))
}

/// Router wired to an arbitrary provider.
pub fn provider_router(provider: Arc<dyn TextProvider>) -> Router {
    build_router(AppState::new(
        test_config(Some(TEST_API_KEY), "http://127.0.0.1:9"),
        provider,
    ))
}

/// Gemini `generateContent` envelope carrying `text` as the first candidate.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 180,
            "candidatesTokenCount": 42,
            "totalTokenCount": 222
        }
    })
}

pub fn travel_request() -> Value {
    json!({
        "age": "30",
        "gender": "Female",
        "location": "Lisbon",
        "interests": "surfing, tiles",
        "budget": "1800",
        "days": "3"
    })
}

pub async fn post_json(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/gemini")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).expect("response body is JSON");
    (status, body)
}

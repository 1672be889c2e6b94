//! Itinerary generation: prompt, one provider call, salvage parse.

use super::metrics;
use super::prompt::build_itinerary_prompt;
use super::providers::{ProviderError, TextProvider};
use super::salvage::parse_salvaged;
use crate::models::TravelRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use service_core::error::error_response;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Reply used when the provider returns no candidate text, or an empty one.
const EMPTY_REPLY: &str = "{}";

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("Request data is required")]
    MissingInput,

    #[error("API key is missing")]
    MissingCredential,

    /// Upstream status and message, passed to the caller as-is.
    #[error("{message}")]
    UpstreamFailure { status: StatusCode, message: String },

    #[error("Invalid JSON format received from LLM")]
    MalformedUpstreamJson(#[source] serde_json::Error),

    #[error("Internal Server Error")]
    Internal(String),
}

impl ItineraryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ItineraryError::MissingInput => StatusCode::BAD_REQUEST,
            ItineraryError::UpstreamFailure { status, .. } => *status,
            ItineraryError::MissingCredential
            | ItineraryError::MalformedUpstreamJson(_)
            | ItineraryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            ItineraryError::MissingInput => "missing_input",
            ItineraryError::MissingCredential => "missing_credential",
            ItineraryError::UpstreamFailure { .. } => "upstream_failure",
            ItineraryError::MalformedUpstreamJson(_) => "malformed_upstream_json",
            ItineraryError::Internal(_) => "internal",
        }
    }
}

impl From<ProviderError> for ItineraryError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => ItineraryError::MissingCredential,
            ProviderError::Upstream { status, message } => ItineraryError::UpstreamFailure {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            ProviderError::NetworkError(msg) | ProviderError::InvalidResponse(msg) => {
                ItineraryError::Internal(msg)
            }
        }
    }
}

impl IntoResponse for ItineraryError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

/// Turns a [`TravelRequest`] into the model's itinerary JSON.
#[derive(Clone)]
pub struct ItineraryService {
    provider: Arc<dyn TextProvider>,
}

impl ItineraryService {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Generate an itinerary.
    ///
    /// Returns whatever JSON value the salvage parse recovers; its shape is
    /// not checked.
    #[tracing::instrument(
        skip(self, request),
        fields(provider = self.provider.name(), location = %request.field("location"), days = %request.field("days"))
    )]
    pub async fn generate(&self, request: &TravelRequest) -> Result<Value, ItineraryError> {
        if !self.provider.is_configured() {
            return Err(ItineraryError::MissingCredential);
        }

        let prompt = build_itinerary_prompt(request);

        let started = Instant::now();
        let result = self.provider.generate(&prompt).await;
        metrics::record_upstream_latency(self.provider.name(), started.elapsed());

        let response = result.map_err(|e| {
            tracing::error!(error = %e, "Itinerary provider call failed");
            ItineraryError::from(e)
        })?;

        tracing::info!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "Received itinerary reply"
        );

        let text = response
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(EMPTY_REPLY);
        parse_salvaged(text).map_err(|e| {
            tracing::error!(error = %e, "Model reply is not valid JSON");
            ItineraryError::MalformedUpstreamJson(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;
    use serde_json::json;

    fn request() -> TravelRequest {
        TravelRequest::from(json!({
            "age": 25,
            "gender": "Female",
            "location": "Lisbon",
            "interests": "surfing",
            "budget": 1800,
            "days": 3
        }))
    }

    fn service(provider: MockTextProvider) -> ItineraryService {
        ItineraryService::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn returns_salvaged_json() {
        let service = service(MockTextProvider::with_reply(true, "Sure! {\"a\":1} done"));
        assert_eq!(service.generate(&request()).await.unwrap(), json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn sample_reply_parses_as_itinerary() {
        let service = service(MockTextProvider::new(true));
        let value = service.generate(&request()).await.unwrap();
        assert_eq!(value["trip_title"], "Tiles and Tides");
        assert_eq!(value["days"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_reply_text_yields_empty_object() {
        let service = service(MockTextProvider::with_reply(true, ""));
        assert_eq!(service.generate(&request()).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_missing_credential() {
        let service = service(MockTextProvider::new(false));
        let err = service.generate(&request()).await.unwrap_err();
        assert!(matches!(err, ItineraryError::MissingCredential));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "API key is missing");
    }

    #[tokio::test]
    async fn reply_without_json_is_malformed() {
        let service = service(MockTextProvider::with_reply(true, "No itinerary today."));
        let err = service.generate(&request()).await.unwrap_err();
        assert!(matches!(err, ItineraryError::MalformedUpstreamJson(_)));
        assert_eq!(err.to_string(), "Invalid JSON format received from LLM");
    }

    #[test]
    fn upstream_status_passes_through() {
        let err = ItineraryError::from(ProviderError::Upstream {
            status: 429,
            message: "Gemini API error: Too Many Requests".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "Gemini API error: Too Many Requests");
        assert_eq!(err.outcome(), "upstream_failure");
    }

    #[test]
    fn network_failure_is_internal() {
        let err = ItineraryError::from(ProviderError::NetworkError("connection reset".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}

//! Text generation providers.
//!
//! The itinerary pipeline talks to a [`TextProvider`], so Gemini can be
//! swapped for the mock in tests and local runs.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The upstream answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of a single generation call.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Text of the first part of the first candidate, if any.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Raw finish reason reported by the provider.
    pub finish_reason: Option<String>,
}

/// Trait for single-prompt text generation.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short provider name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Send one prompt and return the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;
}

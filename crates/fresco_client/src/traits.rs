//! Trait seams between the orchestrator and its remote collaborators.

use async_trait::async_trait;
use fresco_core::EntityState;
use fresco_error::FrescoResult;
use serde::{Deserialize, Serialize};

/// Approximate location hint for localized web search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationHint {
    /// IANA timezone name
    pub timezone: String,
    /// Display name of the home zone, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Request for the text-generation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Developer/system instruction
    pub system_prompt: String,
    /// User instruction filled from the resolved context
    pub user_prompt: String,
    /// Location hint for the web-search request mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationHint>,
}

/// Token-usage counters reported by the text-generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the request
    pub input_tokens: u64,
    /// Tokens produced in the response
    pub output_tokens: u64,
    /// Total tokens billed
    pub total_tokens: u64,
}

/// One text payload plus usage counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    /// The generated text
    pub text: String,
    /// Usage counters, when the service reports them
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Request for the image-generation service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The image prompt
    pub prompt: String,
    /// Model identifier
    pub model: String,
    /// Size as `WIDTHxHEIGHT`
    pub size: String,
    /// Quality tier
    pub quality: String,
}

/// Source of the per-run entity state snapshot.
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch all entity states.
    async fn fetch_states(&self) -> FrescoResult<Vec<EntityState>>;
}

/// Outbound event notification. Fire-and-forget: implementations log
/// failures and never propagate them.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Fire an event with a JSON payload.
    async fn fire_event(&self, event_type: &str, data: &serde_json::Value);
}

/// Text-generation service with two request modes.
///
/// The orchestrator tries [`generate_with_search`](Self::generate_with_search)
/// first and transparently falls back to
/// [`generate_basic`](Self::generate_basic) on any failure.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    /// Richer request mode supporting live web lookup with a location hint.
    async fn generate_with_search(&self, request: &PromptRequest) -> FrescoResult<PromptResponse>;

    /// Simpler request mode without web lookup.
    async fn generate_basic(&self, request: &PromptRequest) -> FrescoResult<PromptResponse>;

    /// Model identifier used for run reports.
    fn model_name(&self) -> &str;
}

/// Image-generation service returning decoded image bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image and return its decoded bytes.
    async fn generate_image(&self, request: &ImageRequest) -> FrescoResult<Vec<u8>>;
}

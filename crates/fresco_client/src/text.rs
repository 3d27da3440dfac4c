//! Text-generation client.
//!
//! Two request modes against the same provider: the Responses API with a
//! `web_search` tool and location hint (richer mode), and plain Chat
//! Completions (simpler fallback mode). The orchestrator owns the fallback
//! policy; this client only exposes both modes.

use crate::{PromptGenerator, PromptRequest, PromptResponse, TokenUsage};
use async_trait::async_trait;
use fresco_error::{ClientError, ClientErrorKind, FrescoResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the remote text-generation service.
#[derive(Debug, Clone)]
pub struct TextClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl TextClient {
    /// Creates a new text-generation client.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
        }
    }

    fn api_key(&self) -> FrescoResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ClientError::new(ClientErrorKind::MissingCredential("OPENAI_API_KEY".into())).into()
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &impl Serialize,
    ) -> FrescoResult<T> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_key()?)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to send text-generation request");
                ClientError::new(ClientErrorKind::Request(e.to_string()))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            error!(status, body = %message, "text-generation API returned error");
            return Err(ClientError::new(ClientErrorKind::Api { status, message }).into());
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Parse(e.to_string())).into())
    }
}

#[async_trait]
impl PromptGenerator for TextClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate_with_search(&self, request: &PromptRequest) -> FrescoResult<PromptResponse> {
        debug!("sending Responses API request with web search");
        let body = ResponsesRequest::from_prompt(&self.model, request);
        let response: ResponsesResponse = self.post_json(RESPONSES_URL, &body).await?;

        let text = response.output_text().ok_or_else(|| {
            ClientError::new(ClientErrorKind::EmptyPayload(
                "Responses API returned no output text".into(),
            ))
        })?;
        Ok(PromptResponse {
            text,
            usage: response.usage.unwrap_or_default().into(),
        })
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate_basic(&self, request: &PromptRequest) -> FrescoResult<PromptResponse> {
        debug!("sending chat-completions request");
        let body = ChatRequest::from_prompt(&self.model, request);
        let response: ChatResponse = self.post_json(CHAT_COMPLETIONS_URL, &body).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ClientError::new(ClientErrorKind::EmptyPayload(
                    "chat completion returned no choices".into(),
                ))
            })?;
        Ok(PromptResponse {
            text,
            usage: response.usage.unwrap_or_default().into(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// --- Responses API wire types ---

#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputMessage>,
    text: TextControls,
    tools: Vec<WebSearchTool>,
    store: bool,
}

impl ResponsesRequest {
    fn from_prompt(model: &str, request: &PromptRequest) -> Self {
        let user_location = request.location.as_ref().map(|hint| UserLocation {
            kind: "approximate".to_string(),
            timezone: Some(hint.timezone.clone()),
            city: hint.city.clone(),
        });
        Self {
            model: model.to_string(),
            input: vec![
                InputMessage::new("developer", &request.system_prompt),
                InputMessage::new("user", &request.user_prompt),
            ],
            text: TextControls::default(),
            tools: vec![WebSearchTool {
                kind: "web_search".to_string(),
                user_location,
                search_context_size: "medium".to_string(),
            }],
            store: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct InputMessage {
    role: String,
    content: Vec<InputContent>,
}

impl InputMessage {
    fn new(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            content: vec![InputContent {
                kind: "input_text".to_string(),
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct InputContent {
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct TextControls {
    format: TextFormat,
    verbosity: String,
}

impl Default for TextControls {
    fn default() -> Self {
        Self {
            format: TextFormat {
                kind: "text".to_string(),
            },
            verbosity: "medium".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct WebSearchTool {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_location: Option<UserLocation>,
    search_context_size: String,
}

#[derive(Debug, Serialize)]
struct UserLocation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<ResponsesUsage>,
}

impl ResponsesResponse {
    /// First non-empty output text across message items.
    fn output_text(&self) -> Option<String> {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .filter(|content| content.kind == "output_text")
            .map(|content| content.text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl From<ResponsesUsage> for TokenUsage {
    fn from(usage: ResponsesUsage) -> Self {
        Self {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

// --- Chat Completions wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

impl ChatRequest {
    fn from_prompt(model: &str, request: &PromptRequest) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            max_tokens: 4096,
            temperature: 1.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        Self {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationHint;

    #[test]
    fn responses_request_carries_location_hint() {
        let request = PromptRequest {
            system_prompt: "system".into(),
            user_prompt: "user".into(),
            location: Some(LocationHint {
                timezone: "America/Phoenix".into(),
                city: Some("Phoenix".into()),
            }),
        };
        let body = ResponsesRequest::from_prompt("gpt-4o", &request);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tools"][0]["type"], "web_search");
        assert_eq!(
            json["tools"][0]["user_location"]["timezone"],
            "America/Phoenix"
        );
        assert_eq!(json["input"][0]["role"], "developer");
        assert_eq!(json["input"][0]["content"][0]["type"], "input_text");
    }

    #[test]
    fn responses_output_text_skips_non_text_items() {
        let raw = serde_json::json!({
            "output": [
                {"content": []},
                {"content": [
                    {"type": "reasoning", "text": ""},
                    {"type": "output_text", "text": "  a prompt  "}
                ]}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 20, "total_tokens": 30}
        });
        let response: ResponsesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.output_text().unwrap(), "a prompt");
    }

    #[test]
    fn chat_usage_maps_to_token_usage() {
        let usage: TokenUsage = ChatUsage {
            prompt_tokens: 5,
            completion_tokens: 7,
            total_tokens: 12,
        }
        .into();
        assert_eq!(usage.input_tokens, 5);
        assert_eq!(usage.total_tokens, 12);
    }
}

//! Image-generation client.

use crate::{ImageGenerator, ImageRequest};
use async_trait::async_trait;
use base64::Engine;
use fresco_error::{ClientError, ClientErrorKind, FrescoResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

const IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for the remote image-generation service.
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: Client,
    api_key: Option<String>,
}

impl ImageClient {
    /// Creates a new image-generation client.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    fn api_key(&self) -> FrescoResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ClientError::new(ClientErrorKind::MissingCredential("OPENAI_API_KEY".into())).into()
        })
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    #[instrument(skip(self, request), fields(model = %request.model, size = %request.size))]
    async fn generate_image(&self, request: &ImageRequest) -> FrescoResult<Vec<u8>> {
        let body = GenerationRequest::from_request(request);
        debug!("sending image-generation request");

        let response = self
            .client
            .post(IMAGES_URL)
            .bearer_auth(self.api_key()?)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to send image-generation request");
                ClientError::new(ClientErrorKind::Request(e.to_string()))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            error!(status, body = %message, "image-generation API returned error");
            return Err(ClientError::new(ClientErrorKind::Api { status, message }).into());
        }

        let payload: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Parse(e.to_string())))?;

        let encoded = payload
            .data
            .into_iter()
            .next()
            .and_then(|item| item.b64_json)
            .ok_or_else(|| {
                ClientError::new(ClientErrorKind::EmptyPayload(
                    "image response carried no base64 payload".into(),
                ))
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ClientError::new(ClientErrorKind::Base64Decode(e.to_string())).into())
    }
}

/// Request shape differs by model family: `gpt-image` models take an
/// `output_format`, other models take a `response_format`.
#[derive(Debug, Serialize)]
struct GenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<String>,
}

impl GenerationRequest {
    fn from_request(request: &ImageRequest) -> Self {
        let gpt_image = request.model.contains("gpt-image");
        Self {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            n: 1,
            size: request.size.clone(),
            quality: request.quality.clone(),
            output_format: gpt_image.then(|| "png".to_string()),
            response_format: (!gpt_image).then(|| "b64_json".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> ImageRequest {
        ImageRequest {
            prompt: "a sunset".into(),
            model: model.into(),
            size: "1536x1024".into(),
            quality: "high".into(),
        }
    }

    #[test]
    fn gpt_image_models_use_output_format() {
        let body = GenerationRequest::from_request(&request("gpt-image-1.5"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["output_format"], "png");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn other_models_use_response_format() {
        let body = GenerationRequest::from_request(&request("dall-e-3"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"], "b64_json");
        assert!(json.get("output_format").is_none());
    }
}

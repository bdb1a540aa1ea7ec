//! OpenAI image provider using the Images API.
//!
//! One `POST /images/generations` per prompt, asking for a single image and
//! reading back its hosted URL:
//! - request: `{model, prompt, n, size, quality}`
//! - response: `{data: [{url, revised_prompt}]}`

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::images::{ImageError, ImageProvider};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_IMAGE_QUALITY: &str = "standard";

// ============================================================================
// Images API Types
// ============================================================================

/// The request body for the generations endpoint
#[derive(Serialize, Debug)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize, Debug)]
struct GeneratedImage {
    url: Option<String>,
    revised_prompt: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generation settings passed through to the Images API.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub model: String,
    pub size: String,
    pub quality: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
            quality: DEFAULT_IMAGE_QUALITY.to_string(),
        }
    }
}

pub struct OpenAiImageProvider {
    api_key: String,
    base_url: String,
    settings: ImageSettings,
    client: reqwest::Client,
}

impl OpenAiImageProvider {
    pub fn new(api_key: String, base_url: Option<String>, settings: ImageSettings) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_key,
            base_url,
            settings,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn resolve(&self, prompt: &str) -> Result<String, ImageError> {
        if self.api_key.is_empty() {
            return Err(ImageError::Config("OpenAI API key is empty".to_string()));
        }

        let request = GenerationRequest {
            model: &self.settings.model,
            prompt,
            n: 1,
            size: &self.settings.size,
            quality: &self.settings.quality,
        };

        info!(
            "OpenAI image request: model={}, size={}, prompt_len={}",
            request.model,
            request.size,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        debug!("OpenAI response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenAI API error: {} - {}", status, err_body);
            return Err(ImageError::Api {
                status,
                message: err_body,
            });
        }

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        let image = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ImageError::Parse("response contained no images".to_string()))?;

        if let Some(revised) = &image.revised_prompt {
            debug!("Prompt revised by provider: {}", revised);
        }

        image
            .url
            .ok_or_else(|| ImageError::Parse("image entry has no url".to_string()))
    }
}

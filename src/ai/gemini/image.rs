use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::ImageGenerationService;
use crate::models::{GeneratedImage, PromptPart, PromptRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use std::time::Duration;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const TEMPERATURE: f32 = 1.0;

/// Gemini only returns images when text is also an accepted modality.
const RESPONSE_MODALITIES: [&str; 2] = ["IMAGE", "TEXT"];

/// Image generation over Gemini's `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    /// `model` is accepted with or without its `models/` resource prefix.
    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = match model.strip_prefix("models/") {
            Some(id) => id.to_string(),
            None => model,
        };

        Self {
            client,
            api_key,
            model,
            base_url: API_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Image request to {} failed: {}", self.model, e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("{} rejected image request ({}): {}", self.model, status, body);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::AiProvider(format!("Unexpected Gemini image response: {}", e))
        })
    }

    fn build_request(prompt: &PromptRequest) -> GenerateContentRequest {
        let parts = prompt
            .parts()
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => Part::Text { text: text.clone() },
                PromptPart::Image { mime_type, data } => Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: base64::engine::general_purpose::STANDARD.encode(data),
                    },
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_modalities: RESPONSE_MODALITIES.iter().map(|m| m.to_string()).collect(),
            },
        }
    }

    /// Decode every inline image across all candidates, in response order.
    fn extract_images(response: GenerateContentResponse) -> Result<Vec<GeneratedImage>> {
        if response.candidates.is_empty() {
            tracing::warn!("Gemini returned no candidates");
        }

        let mut images = Vec::new();
        for candidate in response.candidates {
            let Some(content) = candidate.content else {
                tracing::warn!(
                    "Gemini candidate has no content (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                );
                continue;
            };

            for part in content.parts {
                match part {
                    Part::Text { text } => {
                        tracing::debug!("Skipping text part from Gemini: {}", text);
                    }
                    Part::InlineData { inline_data } if inline_data.data.is_empty() => {
                        tracing::debug!("Skipping empty inline part ({})", inline_data.mime_type);
                    }
                    Part::InlineData { inline_data } => {
                        let data = base64::engine::general_purpose::STANDARD
                            .decode(&inline_data.data)
                            .map_err(|e| {
                                Error::AiProvider(format!(
                                    "Failed to decode Gemini base64 image: {}",
                                    e
                                ))
                            })?;
                        images.push(GeneratedImage::new(inline_data.mime_type, data));
                    }
                }
            }
        }

        Ok(images)
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_images(&self, prompt: &PromptRequest) -> Result<Vec<GeneratedImage>> {
        tracing::debug!(
            "Requesting images from {} ({} reference images)",
            self.model,
            prompt.image_count()
        );

        let request = Self::build_request(prompt);
        let response = self.generate_content(&request).await?;
        let images = Self::extract_images(response)?;

        tracing::debug!("Gemini returned {} images", images.len());
        Ok(images)
    }
}

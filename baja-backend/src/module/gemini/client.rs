///! Gemini API client
///!
///! One `generateContent` call per request, no streaming, no retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use crate::config::GeminiConfig;

/// What the fetcher asks a generative backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Let the model ground its answer with live web search
    pub web_search: bool,
}

/// A text-generation service. The error message is what quota detection inspects,
/// so implementations should keep HTTP status codes and service messages in it.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    response_mime_type: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .user_agent(concat!("baja-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build reqwest client")?;

        if api_key.is_none() {
            tracing::warn!(
                "No API key in ${}; requests will be sent unauthenticated",
                config.api_key_env
            );
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            response_mime_type: config.response_mime_type.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let mut body = GenerateContentRequest::user_prompt(&request.prompt, request.web_search);
        if let Some(mime_type) = &self.response_mime_type {
            body = body.with_response_mime_type(mime_type);
        }
        let url = self.endpoint();

        tracing::debug!("POST {} (web_search: {})", url, request.web_search);

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-goog-api-key", key);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.model))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read Gemini response body")?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => format!(
                    "{} ({})",
                    body.error.message,
                    body.error.status.unwrap_or_else(|| "UNKNOWN".to_string())
                ),
                Err(_) => text.trim().to_string(),
            };
            anyhow::bail!("Gemini API error {}: {}", status.as_u16(), message);
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("Failed to deserialize Gemini response")?;

        match parsed.first_candidate_text() {
            Some(text) => {
                if text.trim().is_empty() {
                    let reason = parsed
                        .candidates
                        .first()
                        .and_then(|c| c.finish_reason.as_deref())
                        .unwrap_or("unknown");
                    tracing::warn!("Gemini returned an empty answer (finish reason: {})", reason);
                }
                Ok(text)
            }
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates".to_string());
                anyhow::bail!("Gemini returned no answer: {}", reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = GeminiConfig {
            base_url: "http://127.0.0.1:9/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new(&config, Some("k".to_string())).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-test:generateContent"
        );
    }
}

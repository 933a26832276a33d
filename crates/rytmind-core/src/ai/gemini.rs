//! Google Gemini backend implementation
//!
//! HTTP client for the generativelanguage API. One request per operation
//! with fixed decoding parameters; no retry or backoff at this layer, the
//! caller decides what a failure means (the budget engine falls back to
//! its local heuristic).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AdvisorBackend;
use crate::error::{Error, Result};
use crate::models::{ChatMessage, ChatRole};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const DEFAULT_MODEL: &str = "gemini-pro";

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the default model
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a new Gemini backend with an explicit model
    pub fn with_model(api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Override the API base URL (for tests against a local stub)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::with_model(&api_key, &model))
    }

    async fn generate_content(&self, contents: Vec<Content>) -> Result<String> {
        // Missing credential fails before any request is made
        if self.api_key.is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        let request = GeminiRequest {
            contents,
            generation_config: GenerationConfig::default(),
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self.http_client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }

        let result: GeminiResponse = response.json().await?;
        let text = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Upstream("No response from Gemini API".to_string()));
        }

        debug!(chars = text.len(), "Gemini response received");
        Ok(text)
    }
}

/// Request to the generateContent endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Fixed decoding parameters for all requests
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Response from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl AdvisorBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }])
        .await
    }

    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String> {
        // Gemini has no dedicated system role; the system prompt rides in
        // front of the first user turn.
        let mut contents = Vec::with_capacity(history.len() + 1);
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: system.to_string(),
            }],
        });
        for msg in history {
            contents.push(Content {
                role: match msg.role {
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "model".to_string(),
                },
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            });
        }
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: user_message.to_string(),
            }],
        });

        self.generate_content(contents).await
    }

    async fn health_check(&self) -> bool {
        // No lightweight ping endpoint; a configured key is the best signal
        !self.api_key.is_empty()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let backend = GeminiBackend::new("");
        let err = backend.generate("hello").await;
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["topK"], 40);
        assert_eq!(json["topP"], 0.95);
        assert_eq!(json["maxOutputTokens"], 2048);
    }
}

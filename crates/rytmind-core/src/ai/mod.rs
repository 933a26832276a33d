//! Pluggable AI advisor backend abstraction
//!
//! This module provides a backend-agnostic interface for the two LLM-backed
//! flows: budget plan generation (single prompt, JSON response) and the
//! therapist chat (system prompt plus conversation turns).
//!
//! # Architecture
//!
//! - `AdvisorBackend` trait: defines the interface for all AI operations
//! - `AdvisorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `RYTMIND_AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-pro)

mod gemini;
mod mock;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ChatMessage;

/// Trait defining the interface for all AI advisor backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    /// Run a single-prompt generation, returning the raw model text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Run a conversational generation with a system prompt and prior turns
    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete advisor client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AdvisorClient {
    /// Google Gemini backend (HTTP API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AdvisorClient {
    /// Create an advisor client from environment variables
    ///
    /// Checks `RYTMIND_AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEMINI_API_KEY and GEMINI_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("RYTMIND_AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(AdvisorClient::Gemini),
            "mock" => Some(AdvisorClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown RYTMIND_AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(AdvisorClient::Gemini)
            }
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(api_key: &str) -> Self {
        AdvisorClient::Gemini(GeminiBackend::new(api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AdvisorClient::Mock(MockBackend::new())
    }
}

// Implement AdvisorBackend for AdvisorClient by delegating to the inner backend
#[async_trait]
impl AdvisorBackend for AdvisorClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            AdvisorClient::Gemini(b) => b.generate(prompt).await,
            AdvisorClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String> {
        match self {
            AdvisorClient::Gemini(b) => b.chat(system, history, user_message).await,
            AdvisorClient::Mock(b) => b.chat(system, history, user_message).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdvisorClient::Gemini(b) => b.health_check().await,
            AdvisorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.model(),
            AdvisorClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AdvisorClient::Gemini(b) => b.host(),
            AdvisorClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_client_mock() {
        let client = AdvisorClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AdvisorClient::mock();
        assert!(client.health_check().await);
    }
}

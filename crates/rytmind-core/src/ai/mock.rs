//! Mock AI backend for testing

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::AdvisorBackend;
use crate::error::Result;
use crate::models::ChatMessage;

/// Canned budget plan returned when no response is configured
const DEFAULT_BUDGET_JSON: &str = r#"{
  "budgets": [
    {
      "category": "Food",
      "suggestedBudget": 500.0,
      "reason": "Covers your regular meals with a small buffer",
      "tips": ["Cook at home twice a week", "Batch lunch orders"],
      "flexibility": "medium"
    },
    {
      "category": "Shopping",
      "suggestedBudget": 200.0,
      "reason": "Trims impulse purchases without cutting essentials",
      "tips": ["Use a 24-hour wishlist before buying"],
      "flexibility": "high"
    }
  ],
  "insights": ["Food is your largest category", "Shopping spikes on weekends"]
}"#;

const DEFAULT_CHAT_REPLY: &str =
    "Thank you for sharing that with me. It sounds like money has been on your \
     mind lately. What feelings come up when you think about your recent spending?";

/// Mock backend that returns a configurable canned response
#[derive(Clone)]
pub struct MockBackend {
    model: String,
    response: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            model: "mock".to_string(),
            response: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock that returns the given text from `generate`
    pub fn with_response(response: &str) -> Self {
        Self {
            model: "mock".to_string(),
            response: Arc::new(Mutex::new(Some(response.to_string()))),
        }
    }

    /// Replace the configured response
    pub fn set_response(&self, response: &str) {
        if let Ok(mut guard) = self.response.lock() {
            *guard = Some(response.to_string());
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let configured = self.response.lock().ok().and_then(|g| g.clone());
        Ok(configured.unwrap_or_else(|| DEFAULT_BUDGET_JSON.to_string()))
    }

    async fn chat(
        &self,
        _system: &str,
        _history: &[ChatMessage],
        _user_message: &str,
    ) -> Result<String> {
        let configured = self.response.lock().ok().and_then(|g| g.clone());
        Ok(configured.unwrap_or_else(|| DEFAULT_CHAT_REPLY.to_string()))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_generate_is_valid_json() {
        let backend = MockBackend::new();
        let text = backend.generate("anything").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["budgets"].is_array());
    }

    #[tokio::test]
    async fn test_configured_response_wins() {
        let backend = MockBackend::with_response("custom");
        assert_eq!(backend.generate("x").await.unwrap(), "custom");
        assert_eq!(backend.chat("s", &[], "x").await.unwrap(), "custom");
    }
}

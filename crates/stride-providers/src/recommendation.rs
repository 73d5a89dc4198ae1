//! Natural-language recommendation generator.
//!
//! The synthesis stage hands the assembled analysis context to an
//! OpenAI-compatible chat completions API and uses the reply verbatim as
//! the final recommendation text.

use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a running route advisor and safety expert. \
Given route candidates with safety, weather, and closure analysis, recommend which \
route to run and why. Acknowledge any warnings present. Be concise but informative.";

#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    /// Turn the analysis context into recommendation text.
    async fn generate(&self, context: &Value) -> Result<String, ProviderError>;
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl RecommendationGenerator for ChatCompletionsClient {
    #[tracing::instrument(skip_all)]
    async fn generate(&self, context: &Value) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Analyze this data and provide a recommendation:\n\n{}",
                        serde_json::to_string_pretty(context)
                            .map_err(|e| ProviderError::Decode(e.to_string()))?
                    ),
                },
            ],
            temperature: 0.3,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ProviderError::UpstreamStatus(status));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::MissingData("completion content"));
        }

        Ok(content)
    }
}

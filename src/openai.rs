use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use reqwest::Client;
use tracing::{info, error};

#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("OPENAI_API_KEY not found in environment variables")] Configuration,
    #[error("HTTP error: {0}")] Http(String),
    #[error("Other: {0}")] Other(String),
}

/// Seam between the pipeline and the external text-generation service.
/// Tests substitute a scripted stub; production uses [`OpenAiClient`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, OpenAiError>;
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Reads the credential and endpoint configuration from the environment.
    /// A missing or empty `OPENAI_API_KEY` is a startup-time fatal condition,
    /// never a per-request error.
    pub fn from_env() -> Result<Self, OpenAiError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(OpenAiError::Configuration)?;
        let base_url = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, OpenAiError> {
        let url = format!("{}/chat/completions", self.base_url);

        info!("🔗 Making request to: {} (model: {})", url, self.model);

        let request_body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": temperature,
        });

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OpenAiError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API error response: {}", error_body);
            return Err(OpenAiError::Http(format!("status={} body={}", status, error_body)));
        }

        let response_text = response.text().await
            .map_err(|e| OpenAiError::Other(e.to_string()))?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| OpenAiError::Other(format!("parse error: {}: {}", e, response_text)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| OpenAiError::Other("no text content in response".into()))
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

//! Mistral chat-completions provider.
//!
//! Sends one user message per call and returns `choices[0].message.content`.
//! Any OpenAI-compatible chat-completions endpoint works with `api_url`
//! pointed at it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{Result, ToneError};

use super::Rewriter;

/// Default chat-completions endpoint.
pub const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default model when none is configured.
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-small";

pub struct MistralProvider {
    api_key: String,
    api_url: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for MistralProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl MistralProvider {
    pub fn new(api_key: &str, api_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToneError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Build from the upstream config section. Fails when no API key is set.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ToneError::Config("upstream API key is not set (MISTRAL_API_KEY)".into())
            })?;
        Self::new(
            api_key,
            &config.api_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }]
        })
    }

    /// Extract the completion text from a chat-completions response.
    pub fn extract_text(response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
    }
}

#[async_trait]
impl Rewriter for MistralProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, "Upstream rewrite request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(prompt))
            .send()
            .await
            .map_err(|e| ToneError::Upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let body_msg = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|v| {
                    v["message"]
                        .as_str()
                        .or_else(|| v["error"]["message"].as_str())
                        .map(String::from)
                })
                .unwrap_or(error_text);
            return Err(ToneError::Upstream(format!("HTTP {status}: {body_msg}")));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ToneError::Upstream(format!("failed to parse response: {e}")))?;

        Self::extract_text(&json)
            .ok_or_else(|| ToneError::Upstream("response has no completion text".into()))
    }
}

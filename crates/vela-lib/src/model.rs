//! Generative model client — one prompt in, response text out.
//!
//! Two request dialects are supported: Gemini `generateContent` and
//! OpenAI-compatible chat completions. Either way the caller gets plain text;
//! JSON answer extraction happens in [`vela_core::response`].

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use vela_core::types::{ModelConfig, ModelProvider};

use crate::error::ServiceError;

const SERVICE: &str = "model";

/// Cloneable handle to the model endpoint.
#[derive(Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    config: ModelConfig,
}

// ─── Request bodies ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// ─── Client ────────────────────────────────────────────────────────────────

impl ModelClient {
    pub fn new(config: ModelConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Send `prompt` and return the model's text.
    ///
    /// A success response without any text yields an empty string, which the
    /// parser turns into a low-confidence fallback.
    pub async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let api_key = self
            .api_key()
            .ok_or(ServiceError::MissingConfig("VELA_MODEL_API_KEY"))?;

        let request = match self.config.provider {
            ModelProvider::Gemini => {
                let url = format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.config.endpoint(),
                    self.config.model
                );
                let body = GeminiRequest {
                    contents: [GeminiContent {
                        parts: [GeminiPart { text: prompt }],
                    }],
                    generation_config: GeminiGenerationConfig {
                        temperature: self.config.temperature,
                        max_output_tokens: self.config.max_output_tokens,
                    },
                };
                self.http
                    .post(url)
                    .header("x-goog-api-key", api_key)
                    .json(&body)
            }
            ModelProvider::OpenAi => {
                let url = format!("{}/v1/chat/completions", self.config.endpoint());
                let body = ChatCompletionRequest {
                    model: &self.config.model,
                    messages: [ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                    temperature: self.config.temperature,
                    max_tokens: self.config.max_output_tokens,
                };
                self.http.post(url).bearer_auth(api_key).json(&body)
            }
        };

        debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "model: sending prompt"
        );

        let resp = request
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        if !resp.status().is_success() {
            return Err(ServiceError::upstream(SERVICE, resp).await);
        }

        let value: Value = resp.json().await.map_err(ServiceError::transport(SERVICE))?;
        let text = extract_text(self.config.provider, &value);
        if text.is_none() {
            warn!("model: response carried no text");
        }
        Ok(text.unwrap_or_default())
    }
}

/// Pull the generated text out of a provider response.
fn extract_text(provider: ModelProvider, value: &Value) -> Option<String> {
    match provider {
        ModelProvider::Gemini => {
            let parts = value
                .pointer("/candidates/0/content/parts")?
                .as_array()?;
            let text: String = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            (!text.is_empty()).then_some(text)
        }
        ModelProvider::OpenAi => value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

//! Shared types for the vela chat backend.
//!
//! Used by vela-lib and vela-cli. Keeping them here means consumers can
//! depend on the data model without pulling in tokio, axum, or reqwest.

use serde::{Deserialize, Serialize};

/// Maximum length of an answer, in characters.
pub const MAX_ANSWER_CHARS: usize = 2000;

/// Answer given when nothing grounds a reply.
pub const NO_INFO_ANSWER: &str =
    "I don't have verified information about that yet. Try asking about my background, strengths, or how I work.";

// ─── Knowledge types ───────────────────────────────────────────────────────

/// A labeled fact used as grounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub text: String,
}

impl Snippet {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

// ─── Answer types ──────────────────────────────────────────────────────────

/// Coarse quality signal attached to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Parse one of the three levels, ignoring case and surrounding space.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// The answer returned to the client for every chat request.
///
/// Construct through [`ResponseEnvelope::new`] so that an envelope without
/// sources is always `low` confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub answer: String,
    pub confidence: Confidence,
    pub sources: Vec<String>,
}

impl ResponseEnvelope {
    pub fn new(answer: impl Into<String>, confidence: Confidence, sources: Vec<String>) -> Self {
        let confidence = if sources.is_empty() {
            Confidence::Low
        } else {
            confidence
        };
        Self {
            answer: truncate_chars(&answer.into(), MAX_ANSWER_CHARS),
            confidence,
            sources,
        }
    }

    /// Low-confidence answer with no sources.
    pub fn ungrounded(answer: impl Into<String>) -> Self {
        Self::new(answer, Confidence::Low, Vec::new())
    }

    /// The fixed reply used when no context could be found.
    pub fn no_info() -> Self {
        Self::ungrounded(NO_INFO_ANSWER)
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

// ─── Upstream configuration ────────────────────────────────────────────────

/// Which request/response dialect the model endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    #[default]
    Gemini,
    OpenAi,
}

impl ModelProvider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAi => "https://api.openai.com",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "open-ai" => Ok(Self::OpenAi),
            other => Err(format!("unknown model provider: {other}")),
        }
    }
}

/// Generative model client configuration.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Base URL; `None` uses the provider's public endpoint.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Gemini,
            endpoint: None,
            api_key: None,
            model: "gemini-2.0-flash".into(),
            temperature: 0.2,
            max_output_tokens: 512,
            timeout_secs: 30,
        }
    }
}

impl ModelConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }
}

/// Text-to-speech client configuration.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub timeout_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.elevenlabs.io".into(),
            api_key: None,
            voice_id: "21m00Tcm4TlvDq8N71oe".into(),
            model_id: "eleven_turbo_v2_5".into(),
            stability: 0.5,
            similarity_boost: 0.75,
            timeout_secs: 30,
        }
    }
}

// ─── Service status ────────────────────────────────────────────────────────

/// Health snapshot served at `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub snippets: usize,
    pub model_configured: bool,
    pub voice_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_force_low_confidence() {
        let env = ResponseEnvelope::new("hi", Confidence::High, vec![]);
        assert_eq!(env.confidence, Confidence::Low);
    }

    #[test]
    fn sources_keep_given_confidence() {
        let env = ResponseEnvelope::new("hi", Confidence::High, vec!["KB_LIFE".into()]);
        assert_eq!(env.confidence, Confidence::High);
    }

    #[test]
    fn answer_is_truncated_to_limit() {
        let long = "é".repeat(MAX_ANSWER_CHARS + 10);
        let env = ResponseEnvelope::ungrounded(long);
        assert_eq!(env.answer.chars().count(), MAX_ANSWER_CHARS);
    }

    #[test]
    fn confidence_parse_is_case_insensitive() {
        assert_eq!(Confidence::parse(" HIGH "), Some(Confidence::High));
        assert_eq!(Confidence::parse("Medium"), Some(Confidence::Medium));
        assert_eq!(Confidence::parse("certain"), None);
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn provider_from_str() {
        assert_eq!("OpenAI".parse::<ModelProvider>(), Ok(ModelProvider::OpenAi));
        assert_eq!("gemini".parse::<ModelProvider>(), Ok(ModelProvider::Gemini));
        assert!("claude".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn model_endpoint_defaults_per_provider() {
        let mut config = ModelConfig::default();
        assert_eq!(config.endpoint(), "https://generativelanguage.googleapis.com");
        config.endpoint = Some("http://127.0.0.1:9000/".into());
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000");
    }
}

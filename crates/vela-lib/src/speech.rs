//! Speech synthesis client — cleaned answer text in, MP3 stream out.

use std::time::Duration;

use axum::body::Bytes;
use futures_util::Stream;
use serde::Serialize;
use tracing::debug;

use vela_core::text_prep::{clean_text_for_tts, is_speakable};
use vela_core::types::VoiceConfig;

use crate::error::ServiceError;

const SERVICE: &str = "speech";

/// Content type of synthesized audio.
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Cloneable handle to the text-to-speech endpoint.
#[derive(Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    config: VoiceConfig,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Successful synthesis; the body has not been read yet.
pub struct AudioStream {
    response: reqwest::Response,
}

impl AudioStream {
    /// Audio bytes as they arrive from upstream.
    pub fn into_stream(self) -> impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static {
        self.response.bytes_stream()
    }
}

impl SpeechClient {
    pub fn new(config: VoiceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// True when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Clean `text` for speech and request audio for it.
    pub async fn synthesize(&self, text: &str) -> Result<AudioStream, ServiceError> {
        let cleaned = clean_text_for_tts(text);
        if !is_speakable(&cleaned) {
            return Err(ServiceError::BadRequest(
                "text has nothing to speak after cleanup".into(),
            ));
        }

        let api_key = self
            .api_key()
            .ok_or(ServiceError::MissingConfig("VELA_VOICE_API_KEY"))?;

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.voice_id
        );
        let body = SynthesisRequest {
            text: &cleaned,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        debug!(voice = %self.config.voice_id, chars = cleaned.len(), "speech: synthesizing");

        let resp = self
            .http
            .post(url)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, AUDIO_MPEG)
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        if !resp.status().is_success() {
            return Err(ServiceError::upstream(SERVICE, resp).await);
        }

        Ok(AudioStream { response: resp })
    }
}

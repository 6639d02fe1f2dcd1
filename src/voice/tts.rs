//! Text-to-speech (TTS) providers

use async_trait::async_trait;

use crate::{Error, Result};

/// Default `OpenAI` API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Voice selection passed to a speech provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    /// Model identifier (e.g. "tts-1")
    pub model: String,
    /// Voice identity (e.g. "alloy")
    pub voice: String,
}

/// Turns text into encoded audio
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` with the given voice, returning Ogg/Opus bytes
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn synthesize(&self, text: &str, voice: &VoiceSelection) -> Result<Vec<u8>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// `OpenAI` speech endpoint
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl OpenAiSpeech {
    /// Create a new `OpenAI` speech provider
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_api_base(api_key, OPENAI_API_BASE.to_string())
    }

    /// Create a provider talking to a custom API base
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn with_api_base(api_key: String, api_base: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeech {
    async fn synthesize(&self, text: &str, voice: &VoiceSelection) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
        }

        let request = TtsRequest {
            model: &voice.model,
            input: text,
            voice: &voice.voice,
            response_format: "opus",
        };

        tracing::debug!(model = %voice.model, voice = %voice.voice, chars = text.len(), "requesting speech");

        let response = self
            .client
            .post(format!("{}/audio/speech", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("OpenAI TTS request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("OpenAI TTS read error: {e}")))?;
        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(OpenAiSpeech::new(String::new()), Err(Error::Config(_))));
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let tts = OpenAiSpeech::with_api_base("sk".to_string(), "http://localhost:9/v1/".to_string())
            .unwrap();
        assert_eq!(tts.api_base, "http://localhost:9/v1");
    }
}

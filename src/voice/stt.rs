//! Speech-to-text (STT) providers

use async_trait::async_trait;

use super::tts::OPENAI_API_BASE;
use crate::{Error, Result};

/// Response from the `OpenAI` transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Turns recorded speech into text
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe encoded audio
    ///
    /// `file_name` carries the extension the provider uses to detect the format.
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// `OpenAI` transcription endpoint (Whisper)
pub struct OpenAiTranscription {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiTranscription {
    /// Create a new transcription provider
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_api_base(api_key, model, OPENAI_API_BASE.to_string())
    }

    /// Create a provider talking to a custom API base
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn with_api_base(api_key: String, model: String, api_base: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for transcription".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

/// MIME type for an audio file name, by extension
pub(crate) fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        "ogg" | "oga" | "opus" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiTranscription {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), file_name, "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name(file_name.to_string())
                    .mime_str(mime_for_file_name(file_name))
                    .map_err(|e| Error::Transcription(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("response_format", "json");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                Error::Transport(format!("transcription request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Transport(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription response");
            Error::Transcription(format!("unreadable transcription response: {e}"))
        })?;

        Ok(result.text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

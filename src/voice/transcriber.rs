//! Transcription of downloaded voice messages

use std::path::Path;
use std::sync::Arc;

use super::stt::TranscriptionProvider;
use crate::{Error, Result};

/// Reads a local audio file and asks the provider for its transcript
pub struct Transcriber {
    provider: Arc<dyn TranscriptionProvider>,
}

impl Transcriber {
    /// Create a transcriber over `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn TranscriptionProvider>) -> Self {
        Self { provider }
    }

    /// Transcribe the audio at `audio_path`
    ///
    /// Single attempt, no caching.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transcription`] if the file is unreadable, the provider
    /// fails, or the transcript is empty
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            Error::Transcription(format!("cannot read {}: {e}", audio_path.display()))
        })?;
        if audio.is_empty() {
            return Err(Error::Transcription(format!(
                "{} is empty",
                audio_path.display()
            )));
        }

        let file_name = audio_path
            .file_name()
            .map_or_else(|| "audio.ogg".to_string(), |n| n.to_string_lossy().into_owned());

        let transcript = self
            .provider
            .transcribe(audio, &file_name)
            .await
            .map_err(|e| match e {
                Error::Transcription(_) => e,
                other => Error::Transcription(format!(
                    "{} provider failed: {other}",
                    self.provider.name()
                )),
            })?;

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(Error::Transcription("provider returned no text".to_string()));
        }

        tracing::info!(path = %audio_path.display(), transcript, "transcription complete");
        Ok(transcript.to_string())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FixedProvider(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl TranscriptionProvider for FixedProvider {
        async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
            assert!(!audio.is_empty());
            assert!(file_name.ends_with(".oga"));
            self.0
                .map(ToString::to_string)
                .map_err(|e| Error::Transport(e.to_string()))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_transcribes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_1.oga");
        std::fs::write(&path, b"OggS").unwrap();

        let transcriber = Transcriber::new(Arc::new(FixedProvider(Ok("  order status \n"))));
        assert_eq!(transcriber.transcribe(&path).await.unwrap(), "order status");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let transcriber = Transcriber::new(Arc::new(FixedProvider(Ok("x"))));
        let err = transcriber
            .transcribe(Path::new("/nonexistent/voice.oga"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transcription(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_and_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_2.oga");
        std::fs::write(&path, b"OggS").unwrap();

        let failing = Transcriber::new(Arc::new(FixedProvider(Err("timeout"))));
        assert!(matches!(failing.transcribe(&path).await, Err(Error::Transcription(_))));

        let silent = Transcriber::new(Arc::new(FixedProvider(Ok("   "))));
        assert!(matches!(silent.transcribe(&path).await, Err(Error::Transcription(_))));
    }
}

//! Cached speech synthesis
//!
//! [`SpeechSynthesizer`] sits between the relay and a [`SpeechProvider`]. Each
//! text is synthesized at most once while its artifact stays on disk.

use std::path::PathBuf;
use std::sync::Arc;

use super::cache::{CacheKey, ContentCache};
use super::tts::{SpeechProvider, VoiceSelection};
use crate::config::VoiceConfig;
use crate::{Error, Result};

/// A synthesized audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    /// Content key of the spoken text
    pub key: CacheKey,
    /// Location of the Ogg/Opus file
    pub path: PathBuf,
    /// Whether the file was served from the cache
    pub from_cache: bool,
}

/// Text-to-speech with a content cache in front of the provider
pub struct SpeechSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    cache: ContentCache,
    voice: VoiceSelection,
}

impl SpeechSynthesizer {
    /// Create a synthesizer writing into `config.outgoing_dir`
    #[must_use]
    pub fn new(provider: Arc<dyn SpeechProvider>, config: &VoiceConfig) -> Self {
        Self {
            provider,
            cache: ContentCache::new(config.outgoing_dir.clone()),
            voice: VoiceSelection {
                model: config.voice_model.clone(),
                voice: config.voice_name.clone(),
            },
        }
    }

    /// The cache backing this synthesizer
    #[must_use]
    pub const fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Produce an audio artifact for `text`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if the text is empty, the provider fails,
    /// or no file ends up at the artifact path
    pub async fn synthesize(&self, text: &str) -> Result<AudioArtifact> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("nothing to synthesize".to_string()));
        }

        let key = CacheKey::for_text(text);
        if let Some(path) = self.cache.lookup(&key).await {
            tracing::debug!(%key, path = %path.display(), "audio for text already exists");
            return Ok(AudioArtifact {
                key,
                path,
                from_cache: true,
            });
        }

        let audio = self
            .provider
            .synthesize(text, &self.voice)
            .await
            .map_err(|e| Error::Synthesis(format!("{} provider failed: {e}", self.provider.name())))?;

        if audio.is_empty() {
            return Err(Error::Synthesis("provider returned no audio".to_string()));
        }

        let path = self.write_artifact(&key, &audio).await?;
        self.cache.insert(key.clone(), path.clone());

        tracing::info!(%key, path = %path.display(), bytes = audio.len(), "synthesized audio");
        Ok(AudioArtifact {
            key,
            path,
            from_cache: false,
        })
    }

    /// Delete a delivered artifact; the next request for its text re-synthesizes
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be removed
    pub async fn discard(&self, artifact: &AudioArtifact) -> Result<()> {
        self.cache.evict(&artifact.key).await
    }

    /// Write to a unique temp file, then rename onto the deterministic path
    async fn write_artifact(&self, key: &CacheKey, audio: &[u8]) -> Result<PathBuf> {
        let dir = self.cache.dir();
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::Synthesis(format!("cannot create {}: {e}", dir.display()))
        })?;

        let path = self.cache.path_for(key);
        let tmp = dir.join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp, audio).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::Synthesis(format!("cannot write {}: {e}", tmp.display())));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::Synthesis(format!("cannot move audio into place: {e}")));
        }

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::Synthesis(format!(
                "audio file has not been created: {}",
                path.display()
            )));
        }

        Ok(path)
    }
}

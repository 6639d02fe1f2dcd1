//! YAML configuration file loading
//!
//! Every field is optional; the file is a partial overlay on top of defaults.
//! Secrets never live here, they come from the environment.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Top-level YAML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RelayConfigFile {
    /// Voice storage and speech settings
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Telegram behaviour
    #[serde(default)]
    pub telegram: TelegramFileConfig,
}

/// `voice:` section
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Directory for downloaded inbound voice messages
    pub store_dir: Option<PathBuf>,

    /// Directory for synthesized outbound audio
    pub outgoing_dir: Option<PathBuf>,

    /// Remove the downloaded voice file once transcribed
    pub delete_after_transcription: Option<bool>,

    /// Remove the synthesized audio once delivered
    pub delete_tts_after_sending: Option<bool>,

    /// TTS model (e.g. "tts-1")
    pub voice_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub voice_name: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub transcription_model: Option<String>,
}

/// `telegram:` section
#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    /// Refuse senders without a Telegram username
    pub require_username: Option<bool>,

    /// Seconds to wait between `getUpdates` calls
    pub poll_interval_secs: Option<u64>,
}

impl RelayConfigFile {
    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid YAML for this schema
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse the file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Load the config file
///
/// An explicit path must exist. Without one, `./config.yaml` and then the
/// per-user config path are tried; if neither exists defaults are used.
///
/// # Errors
///
/// Returns error if an existing file cannot be read or parsed
pub fn load_config_file(explicit: Option<&Path>) -> Result<RelayConfigFile> {
    if let Some(path) = explicit {
        let config = RelayConfigFile::read(path)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let candidates = [Some(PathBuf::from("config.yaml")), config_file_path()];
    for path in candidates.into_iter().flatten() {
        if path.exists() {
            let config = RelayConfigFile::read(&path)?;
            tracing::info!(path = %path.display(), "loaded config file");
            return Ok(config);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(RelayConfigFile::default())
}

/// Return the per-user config file path: `~/.config/chat-relay/config.yaml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("chat-relay").join("config.yaml"))
}

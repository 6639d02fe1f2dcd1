//! Configuration management for the relay
//!
//! Settings come from an optional YAML file (see [`file`]); credentials and the
//! backend endpoint come from the environment. The resulting [`Config`] is
//! built once at startup and shared read-only.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::{Error, Result};
use file::RelayConfigFile;

/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_KEY";

/// Environment variable holding the backend URL
pub const BACKEND_ENDPOINT_ENV: &str = "BACKEND_ENDPOINT";

/// Environment variable holding the `OpenAI` API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Relay configuration
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token
    pub telegram_token: SecretString,

    /// Backend endpoint receiving message envelopes
    pub backend_endpoint: Url,

    /// `OpenAI` API key (transcription and speech)
    pub openai_api_key: SecretString,

    /// Voice handling configuration
    pub voice: VoiceConfig,

    /// Telegram behaviour
    pub telegram: TelegramConfig,
}

/// Voice handling configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Directory for downloaded inbound voice messages
    pub store_dir: PathBuf,

    /// Directory for synthesized outbound audio
    pub outgoing_dir: PathBuf,

    /// Remove the downloaded voice file once transcribed
    pub delete_after_transcription: bool,

    /// Remove the synthesized audio once delivered
    pub delete_tts_after_sending: bool,

    /// TTS model
    pub voice_model: String,

    /// TTS voice identifier
    pub voice_name: String,

    /// STT model
    pub transcription_model: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("voice_messages"),
            outgoing_dir: PathBuf::from("outgoing_voice"),
            delete_after_transcription: false,
            delete_tts_after_sending: false,
            voice_model: "tts-1".to_string(),
            voice_name: "alloy".to_string(),
            transcription_model: "whisper-1".to_string(),
        }
    }
}

/// Telegram behaviour
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Refuse senders without a Telegram username
    pub require_username: bool,

    /// Pause between `getUpdates` calls
    pub poll_interval: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            require_username: false,
            poll_interval: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Load configuration from the config file and the process environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file is invalid or a required variable is missing
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = file::load_config_file(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Combine a parsed config file with values looked up by `env`
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or the endpoint is not a URL
    pub fn resolve<F>(file: RelayConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} must be set")))
        };

        let telegram_token = SecretString::from(required(TELEGRAM_TOKEN_ENV)?);
        let openai_api_key = SecretString::from(required(OPENAI_API_KEY_ENV)?);

        let endpoint = required(BACKEND_ENDPOINT_ENV)?;
        let backend_endpoint = Url::parse(endpoint.trim())
            .map_err(|e| Error::Config(format!("{BACKEND_ENDPOINT_ENV} is not a valid URL: {e}")))?;
        if !matches!(backend_endpoint.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "{BACKEND_ENDPOINT_ENV} must be an http(s) URL"
            )));
        }

        let defaults = VoiceConfig::default();
        let fv = file.voice;
        let voice = VoiceConfig {
            store_dir: fv.store_dir.unwrap_or(defaults.store_dir),
            outgoing_dir: fv.outgoing_dir.unwrap_or(defaults.outgoing_dir),
            delete_after_transcription: fv
                .delete_after_transcription
                .unwrap_or(defaults.delete_after_transcription),
            delete_tts_after_sending: fv
                .delete_tts_after_sending
                .unwrap_or(defaults.delete_tts_after_sending),
            voice_model: fv.voice_model.unwrap_or(defaults.voice_model),
            voice_name: fv.voice_name.unwrap_or(defaults.voice_name),
            transcription_model: fv
                .transcription_model
                .unwrap_or(defaults.transcription_model),
        };

        let ft = file.telegram;
        let telegram = TelegramConfig {
            require_username: ft.require_username.unwrap_or(false),
            poll_interval: ft
                .poll_interval_secs
                .map_or(TelegramConfig::default().poll_interval, Duration::from_secs),
        };

        Ok(Self {
            telegram_token,
            backend_endpoint,
            openai_api_key,
            voice,
            telegram,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env_with(&[
            (TELEGRAM_TOKEN_ENV, "123:abc"),
            (BACKEND_ENDPOINT_ENV, "http://localhost:8000/myendpoint"),
            (OPENAI_API_KEY_ENV, "sk-test"),
        ])
    }

    #[test]
    fn test_resolve_defaults() {
        let env = full_env();
        let config = Config::resolve(RelayConfigFile::default(), |k| env.get(k).cloned()).unwrap();

        assert_eq!(config.telegram_token.expose_secret(), "123:abc");
        assert_eq!(config.backend_endpoint.path(), "/myendpoint");
        assert_eq!(config.voice.store_dir, PathBuf::from("voice_messages"));
        assert_eq!(config.voice.voice_model, "tts-1");
        assert_eq!(config.voice.transcription_model, "whisper-1");
        assert!(!config.voice.delete_after_transcription);
        assert!(!config.telegram.require_username);
        assert_eq!(config.telegram.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_resolve_file_overrides() {
        let env = full_env();
        let file = RelayConfigFile::parse(
            "voice:\n  voice_name: echo\n  delete_tts_after_sending: true\ntelegram:\n  require_username: true\n  poll_interval_secs: 1\n",
        )
        .unwrap();
        let config = Config::resolve(file, |k| env.get(k).cloned()).unwrap();

        assert_eq!(config.voice.voice_name, "echo");
        assert!(config.voice.delete_tts_after_sending);
        assert!(config.telegram.require_username);
        assert_eq!(config.telegram.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_resolve_missing_token() {
        let mut env = full_env();
        env.remove(TELEGRAM_TOKEN_ENV);
        let err = Config::resolve(RelayConfigFile::default(), |k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains(TELEGRAM_TOKEN_ENV));
    }

    #[test]
    fn test_resolve_rejects_bad_endpoint() {
        let mut env = full_env();
        env.insert(BACKEND_ENDPOINT_ENV.to_string(), "not a url".to_string());
        assert!(Config::resolve(RelayConfigFile::default(), |k| env.get(k).cloned()).is_err());

        env.insert(BACKEND_ENDPOINT_ENV.to_string(), "ftp://example.com/in".to_string());
        assert!(Config::resolve(RelayConfigFile::default(), |k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let env = full_env();
        let config = Config::resolve(RelayConfigFile::default(), |k| env.get(k).cloned()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(!rendered.contains("sk-test"));
    }
}

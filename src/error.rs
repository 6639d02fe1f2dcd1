//! Error types for the relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Notice sent when a user without a username talks to the bot
pub const USERNAME_REQUIRED_NOTICE: &str = "Please set a Telegram username to use this bot.";

/// Errors that can occur while relaying a message
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Platform, provider or network call failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Text-to-speech produced no audio
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Speech-to-text produced no usable text
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Backend answered with a non-success status or a malformed body
    #[error("backend failure: {0}")]
    BackendFailure(String),

    /// Sender lacks the verified identity the relay requires
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Text shown to the chat user when this error ends an event's pipeline
    #[must_use]
    pub fn user_notice(&self) -> String {
        match self {
            Self::PermissionDenied(_) => USERNAME_REQUIRED_NOTICE.to_string(),
            Self::BackendFailure(reason) => reason.clone(),
            Self::Transcription(_) => "Failed to process voice message".to_string(),
            Self::Transport(_) | Self::Synthesis(_) | Self::Http(_) | Self::Io(_) => {
                "Failed to process message, please try again later".to_string()
            }
            Self::Config(_) | Self::Serialization(_) | Self::Yaml(_) => {
                "The relay is misconfigured".to_string()
            }
        }
    }
}

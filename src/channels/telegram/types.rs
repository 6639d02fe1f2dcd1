//! Telegram Bot API request/response types

use serde::{Deserialize, Serialize};

/// Telegram Bot API base URL
pub(crate) const API_BASE: &str = "https://api.telegram.org";

/// File name given to uploaded synthesized audio
pub(crate) const AUDIO_UPLOAD_NAME: &str = "Message.ogg";

/// Telegram sendMessage request
#[derive(Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

/// Telegram getFile request
#[derive(Serialize)]
pub(crate) struct GetFileRequest<'a> {
    pub file_id: &'a str,
}

/// Telegram getUpdates request
#[derive(Serialize)]
pub(crate) struct GetUpdatesRequest {
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// File metadata from Telegram getFile response
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramFile {
    pub file_path: Option<String>,
}

/// Telegram API response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> TelegramResponse<T> {
    /// Unwrap the result, turning `ok: false` into the API description
    pub fn into_result(self, method: &str) -> crate::Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(crate::Error::Transport(format!(
                "Telegram {method} error: {}",
                self.description.unwrap_or_else(|| "no result".to_string())
            ))),
        }
    }
}

/// A single update from getUpdates
#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// Message carried by an update
#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub voice: Option<Voice>,
}

/// Chat info
#[derive(Debug, Deserialize)]
pub(crate) struct Chat {
    pub id: i64,
}

/// Sender info
#[derive(Debug, Deserialize)]
pub(crate) struct User {
    pub id: i64,
    pub is_bot: bool,
    pub username: Option<String>,
}

/// Voice note attached to a message
#[derive(Debug, Deserialize)]
pub(crate) struct Voice {
    pub file_id: String,
    pub mime_type: Option<String>,
}

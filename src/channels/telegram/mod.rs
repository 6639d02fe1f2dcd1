//! Telegram channel adapter
//!
//! Uses long polling for receiving messages and the Bot API for sending

mod api;
mod chunking;
pub mod dedup;
pub mod polling;
mod types;

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;

use super::{ChatPlatform, RemoteFile};
use crate::Result;

pub use dedup::UpdateDedup;

/// Telegram channel adapter
#[derive(Clone)]
pub struct TelegramChannel {
    token: String,
    client: Client,
    api_base: String,
}

impl TelegramChannel {
    /// Create a new Telegram channel adapter
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, types::API_BASE)
    }

    /// Create an adapter talking to a Bot API server at `api_base`
    #[must_use]
    pub fn with_api_base(token: String, api_base: &str) -> Self {
        Self {
            token,
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    fn file_url(&self, remote_path: &str) -> String {
        format!("{}/file/bot{}/{remote_path}", self.api_base, self.token)
    }
}

#[async_trait]
impl ChatPlatform for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await
    }

    async fn send_audio(&self, chat_id: i64, audio_path: &Path) -> Result<()> {
        self.send_audio_file(chat_id, audio_path).await
    }

    async fn fetch_file(&self, file_id: &str) -> Result<RemoteFile> {
        self.download_file(file_id).await
    }
}

//! Chat platform adapters
//!
//! The relay talks to the platform only through [`ChatPlatform`]; the Telegram
//! Bot API implementation lives in [`telegram`].

pub mod telegram;

use std::path::Path;

use async_trait::async_trait;

pub use telegram::TelegramChannel;

use crate::Result;

/// A file fetched from the platform
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// File contents
    pub data: Vec<u8>,
    /// Path of the file on the platform's file server
    pub remote_path: String,
}

/// Outbound actions the relay needs from a chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Platform name for logging
    fn name(&self) -> &'static str;

    /// Send a text message
    ///
    /// # Errors
    ///
    /// Returns error if the platform rejects or never receives the message
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Upload a local audio file as an audio message
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the upload fails
    async fn send_audio(&self, chat_id: i64, audio_path: &Path) -> Result<()>;

    /// Download a file by its platform reference
    ///
    /// # Errors
    ///
    /// Returns error if the reference cannot be resolved or downloaded
    async fn fetch_file(&self, file_id: &str) -> Result<RemoteFile>;
}

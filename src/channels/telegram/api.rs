//! Raw Telegram Bot API calls

use std::path::Path;

use reqwest::multipart::{Form, Part};

use super::chunking::{CHUNK_LIMIT, chunk_text};
use super::types::{
    AUDIO_UPLOAD_NAME, GetFileRequest, SendMessageRequest, TelegramFile, TelegramResponse,
};
use crate::channels::RemoteFile;
use crate::{Error, Result};

impl super::TelegramChannel {
    /// Send a plain text message to a chat
    ///
    /// Text over Telegram's size limit goes out as several messages, in order.
    ///
    /// # Errors
    ///
    /// Returns error if the text is empty or any API request fails
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let chunks = chunk_text(text, CHUNK_LIMIT);
        if chunks.is_empty() {
            return Err(Error::Transport(
                "cannot send an empty message on Telegram".to_string(),
            ));
        }

        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            self.send_message_chunk(chat_id, chunk).await?;
            if total > 1 {
                tracing::debug!(chat_id, chunk = index + 1, total, "Telegram chunk sent");
            }
        }
        Ok(())
    }

    async fn send_message_chunk(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram sendMessage error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_lower = body.to_lowercase();

            if body_lower.contains("chat not found")
                || body_lower.contains("bot was blocked by the user")
            {
                return Err(Error::Transport(format!(
                    "Telegram chat {chat_id} not reachable: {body}"
                )));
            }

            return Err(Error::Transport(format!(
                "Telegram sendMessage error: {status} - {body}"
            )));
        }

        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }

    /// Upload a local Ogg file with `sendAudio`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the upload fails
    pub async fn send_audio_file(&self, chat_id: i64, audio_path: &Path) -> Result<()> {
        let data = tokio::fs::read(audio_path).await?;
        let bytes = data.len();

        let part = Part::bytes(data)
            .file_name(AUDIO_UPLOAD_NAME)
            .mime_str("audio/ogg")
            .map_err(|e| Error::Transport(format!("invalid audio MIME type: {e}")))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("audio", part);

        let response = self
            .client
            .post(self.method_url("sendAudio"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram sendAudio error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Telegram sendAudio read error: {e}")))?;

        let parsed: TelegramResponse<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("Telegram sendAudio {status}: {e}")))?;
        parsed.into_result("sendAudio")?;

        tracing::debug!(chat_id, bytes, path = %audio_path.display(), "Telegram audio sent");
        Ok(())
    }

    /// Download a file from Telegram by `file_id`.
    ///
    /// Calls `getFile` to get the file path, then downloads it from the file
    /// server.
    ///
    /// # Errors
    ///
    /// Returns error if the API request or download fails
    pub async fn download_file(&self, file_id: &str) -> Result<RemoteFile> {
        let response = self
            .client
            .post(self.method_url("getFile"))
            .json(&GetFileRequest { file_id })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram getFile error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Telegram getFile response read error: {e}")))?;

        let parsed: TelegramResponse<TelegramFile> = serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("Telegram getFile parse error: {e}")))?;

        let remote_path = parsed.into_result("getFile")?.file_path.ok_or_else(|| {
            Error::Transport("Telegram getFile returned no file_path".to_string())
        })?;

        let download = self
            .client
            .get(self.file_url(&remote_path))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram file download error: {e}")))?;

        if !download.status().is_success() {
            return Err(Error::Transport(format!(
                "Telegram file download failed with status {}",
                download.status()
            )));
        }

        let data = download
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Telegram file download read error: {e}")))?;

        tracing::debug!(file_id, remote_path, bytes = data.len(), "Telegram file downloaded");
        Ok(RemoteFile {
            data: data.to_vec(),
            remote_path,
        })
    }

    /// Delete webhook (switch to polling mode)
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    pub async fn delete_webhook(&self) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("deleteWebhook"))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram deleteWebhook error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "Telegram deleteWebhook error: {status} - {body}"
            )));
        }

        tracing::info!("Telegram webhook deleted");
        Ok(())
    }

    /// Validate the bot token by calling `getMe`
    ///
    /// # Errors
    ///
    /// Returns error if the token is invalid
    pub async fn get_me(&self) -> Result<()> {
        let response = self
            .client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Telegram getMe error: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Config("Invalid Telegram bot token".to_string()));
        }

        Ok(())
    }
}

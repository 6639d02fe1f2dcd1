//! Telegram polling mode: getUpdates loop and event conversion

use std::time::Duration;

use tokio::sync::mpsc;

use super::dedup::UpdateDedup;
use super::types::{GetUpdatesRequest, TelegramResponse, Update};
use crate::relay::{AudioRef, InboundEvent};

/// Server-side long-poll timeout in seconds
const LONG_POLL_TIMEOUT_SECS: u64 = 30;

impl super::TelegramChannel {
    /// Spawn a background task that polls Telegram's getUpdates API
    ///
    /// Text and voice messages are converted into [`InboundEvent`]s and sent
    /// into `tx`. The task ends once the receiving side is dropped. Any
    /// existing webhook is deleted first so getUpdates works.
    pub fn start_polling(
        &self,
        interval: Duration,
        tx: mpsc::Sender<InboundEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let channel = self.clone();
        tokio::spawn(async move {
            channel.polling_loop(interval, tx).await;
        })
    }

    async fn polling_loop(&self, interval: Duration, tx: mpsc::Sender<InboundEvent>) {
        if let Err(e) = self.delete_webhook().await {
            tracing::warn!(error = %e, "failed to delete Telegram webhook before polling");
        }

        tracing::info!(interval_secs = interval.as_secs(), "starting polling");

        let mut offset: Option<i64> = None;
        let mut dedup = UpdateDedup::default();

        while !tx.is_closed() {
            match self.get_updates(offset).await {
                Ok(updates) => {
                    for update in &updates {
                        offset = Some(update.update_id + 1);

                        if dedup.is_duplicate(update.update_id) {
                            tracing::debug!(update_id = update.update_id, "skipping duplicate update");
                            continue;
                        }

                        if let Some(event) = update_to_event(update)
                            && tx.send(event).await.is_err()
                        {
                            tracing::debug!("event receiver closed, stopping polling");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram getUpdates error");
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    async fn get_updates(&self, offset: Option<i64>) -> crate::Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            timeout: LONG_POLL_TIMEOUT_SECS,
            allowed_updates: &["message"],
            offset,
        };

        let body = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        let parsed: TelegramResponse<Vec<Update>> = serde_json::from_str(&body)?;
        parsed.into_result("getUpdates")
    }
}

/// Convert an update into an [`InboundEvent`]
///
/// Only text and voice messages from humans are relayed.
pub(crate) fn update_to_event(update: &Update) -> Option<InboundEvent> {
    let msg = update.message.as_ref()?;

    if msg.from.as_ref().is_some_and(|u| u.is_bot) {
        return None;
    }

    let mut event = if let Some(voice) = &msg.voice {
        InboundEvent::voice(
            msg.chat.id,
            AudioRef {
                file_id: voice.file_id.clone(),
                mime_type: voice.mime_type.clone(),
            },
        )
    } else {
        let text = msg.text.as_ref().filter(|t| !t.trim().is_empty())?;
        InboundEvent::text(msg.chat.id, text.clone())
    };

    if let Some(user) = &msg.from {
        tracing::debug!(chat_id = msg.chat.id, user_id = user.id, kind = ?event.kind(), "received update");
        if let Some(username) = &user.username {
            event = event.with_username(username.clone());
        }
    }

    Some(event)
}

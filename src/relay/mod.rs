//! Inbound message relay
//!
//! [`InboundRelay`] turns one inbound event into a backend call and the replies
//! the backend asks for:
//!
//! ```text
//! event ──► (voice: download ► transcribe ► delete?) ──► backend POST
//!                                                          │
//!             failure notice ◄── failure ──────────────────┤
//!                                                          ▼
//!                              success: voice reply? ► text reply
//! ```
//!
//! Errors never leave [`InboundRelay::handle`]; they become a text notice to
//! the user and a log line.

mod event;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub use event::{AudioRef, EventKind, EventPayload, InboundEvent};

use crate::backend::{BackendResponse, BackendStatus, MessageBackend, MessageEnvelope};
use crate::channels::ChatPlatform;
use crate::config::Config;
use crate::voice::{SpeechSynthesizer, Transcriber};
use crate::{Error, Result};

/// Orchestrates the per-event pipeline
pub struct InboundRelay {
    platform: Arc<dyn ChatPlatform>,
    backend: Arc<dyn MessageBackend>,
    transcriber: Transcriber,
    synthesizer: SpeechSynthesizer,
    require_username: bool,
    store_dir: PathBuf,
    delete_after_transcription: bool,
    delete_tts_after_sending: bool,
}

impl InboundRelay {
    /// Wire the relay to its collaborators
    #[must_use]
    pub fn new(
        config: &Config,
        platform: Arc<dyn ChatPlatform>,
        backend: Arc<dyn MessageBackend>,
        transcriber: Transcriber,
        synthesizer: SpeechSynthesizer,
    ) -> Self {
        Self {
            platform,
            backend,
            transcriber,
            synthesizer,
            require_username: config.telegram.require_username,
            store_dir: config.voice.store_dir.clone(),
            delete_after_transcription: config.voice.delete_after_transcription,
            delete_tts_after_sending: config.voice.delete_tts_after_sending,
        }
    }

    /// Handle one inbound event to completion
    ///
    /// Any error is logged and reported to the chat as a text notice; a failure
    /// to send that notice is only logged.
    pub async fn handle(&self, event: InboundEvent) {
        let chat_id = event.chat_id;
        let kind = event.kind();

        if let Err(e) = self.process(event).await {
            tracing::warn!(
                platform = self.platform.name(),
                chat_id,
                ?kind,
                error = %e,
                "error handling message"
            );
            self.notify(chat_id, &e).await;
        }
    }

    /// Receive events until `shutdown` resolves or the sender is dropped
    ///
    /// Each event runs in its own task. Events still queued at shutdown are
    /// handled, and outstanding tasks are joined before returning; the return
    /// value is the number of events handled.
    pub async fn serve<F>(
        self: Arc<Self>,
        mut events: mpsc::Receiver<InboundEvent>,
        shutdown: F,
    ) -> usize
    where
        F: Future<Output = ()> + Send,
    {
        let mut tasks = JoinSet::new();
        let mut handled = 0usize;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(in_flight = tasks.len(), "shutdown requested");
                    break;
                }
                received = events.recv() => {
                    let Some(event) = received else {
                        tracing::debug!("event source closed");
                        break;
                    };
                    let relay = Arc::clone(&self);
                    tasks.spawn(async move { relay.handle(event).await });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    handled += 1;
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "event task panicked");
                    }
                }
            }
        }

        // Queued events were already acknowledged upstream; run them too
        events.close();
        while let Ok(event) = events.try_recv() {
            let relay = Arc::clone(&self);
            tasks.spawn(async move { relay.handle(event).await });
        }

        while let Some(joined) = tasks.join_next().await {
            handled += 1;
            if let Err(e) = joined {
                tracing::error!(error = %e, "event task panicked");
            }
        }

        handled
    }

    async fn process(&self, event: InboundEvent) -> Result<()> {
        if self.require_username && !event.has_username() {
            return Err(Error::PermissionDenied(format!(
                "chat {} has no username",
                event.chat_id
            )));
        }

        let chat_id = event.chat_id;
        match event.payload {
            EventPayload::Text(text) => self.relay_message(chat_id, text).await,
            EventPayload::Voice(audio) => self.relay_voice(chat_id, &audio).await,
        }
    }

    /// Voice path: download, transcribe, relay, then echo path and transcript
    async fn relay_voice(&self, chat_id: i64, audio: &AudioRef) -> Result<()> {
        let path = self.download_audio(audio).await?;

        let transcribed = self.transcriber.transcribe(&path).await;
        if self.delete_after_transcription {
            remove_scratch_file(&path).await;
        }
        let transcript = transcribed?;

        // A backend failure is reported but still followed by the echo
        if let Err(e) = self.relay_message(chat_id, transcript.clone()).await {
            tracing::warn!(chat_id, error = %e, "relaying transcript failed");
            self.notify(chat_id, &e).await;
        }

        self.platform
            .send_text(chat_id, &format!("Voice message saved to: {}", path.display()))
            .await?;
        self.platform
            .send_text(chat_id, &format!("Transcript: {transcript}"))
            .await
    }

    async fn relay_message(&self, chat_id: i64, message: String) -> Result<()> {
        if message.trim().is_empty() {
            tracing::debug!(chat_id, "ignoring empty message");
            return Ok(());
        }

        let envelope = MessageEnvelope::new(message, chat_id);
        let response = self.backend.forward(&envelope).await;
        self.dispatch(chat_id, response).await
    }

    /// Send the replies the backend asked for: voice first, then text
    async fn dispatch(&self, chat_id: i64, response: BackendResponse) -> Result<()> {
        match response.status {
            BackendStatus::Failure(reason) => Err(Error::BackendFailure(reason.to_string())),
            BackendStatus::Success => {
                let Some(reply) = response.message_to_user else {
                    tracing::debug!(chat_id, "backend sent no reply");
                    return Ok(());
                };

                if response.include_voice_message
                    && let Err(e) = self.send_voice_reply(chat_id, &reply).await
                {
                    tracing::warn!(chat_id, error = %e, "voice reply failed, sending text only");
                }

                self.platform.send_text(chat_id, &reply).await
            }
        }
    }

    async fn send_voice_reply(&self, chat_id: i64, text: &str) -> Result<()> {
        let artifact = self.synthesizer.synthesize(text).await?;
        self.platform.send_audio(chat_id, &artifact.path).await?;
        tracing::info!(chat_id, key = %artifact.key, cached = artifact.from_cache, "voice reply sent");

        if self.delete_tts_after_sending
            && let Err(e) = self.synthesizer.discard(&artifact).await
        {
            tracing::warn!(path = %artifact.path.display(), error = %e, "failed to delete sent audio");
        }
        Ok(())
    }

    async fn download_audio(&self, audio: &AudioRef) -> Result<PathBuf> {
        let file = self.platform.fetch_file(&audio.file_id).await?;

        tokio::fs::create_dir_all(&self.store_dir).await?;
        let path = self.store_dir.join(audio.local_file_name(&file.remote_path));
        tokio::fs::write(&path, &file.data).await?;

        tracing::info!(path = %path.display(), bytes = file.data.len(), "voice message downloaded");
        Ok(path)
    }

    async fn notify(&self, chat_id: i64, error: &Error) {
        if let Err(e) = self.platform.send_text(chat_id, &error.user_notice()).await {
            tracing::error!(
                platform = self.platform.name(),
                chat_id,
                error = %e,
                "failed to send error message to user"
            );
        }
    }
}

async fn remove_scratch_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "deleted voice message after transcription"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to delete voice message"),
    }
}

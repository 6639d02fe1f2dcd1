//! Shared test utilities
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chat_relay::config::{TelegramConfig, VoiceConfig};
use chat_relay::voice::{SpeechProvider, TranscriptionProvider, VoiceSelection};
use chat_relay::{
    BackendResponse, BackendStatus, ChatPlatform, Config, Error, InboundRelay, MessageBackend,
    MessageEnvelope, RemoteFile, SpeechSynthesizer, Transcriber,
};
use secrecy::SecretString;
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Something the relay did on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Text { chat_id: i64, text: String },
    Audio { chat_id: i64, path: PathBuf, existed: bool },
}

/// Mock platform recording outbound actions in order
#[derive(Default)]
pub struct MockPlatform {
    actions: Mutex<Vec<Action>>,
    files: HashMap<String, RemoteFile>,
    fail_text: bool,
}

impl MockPlatform {
    pub fn with_file(mut self, file_id: &str, remote_path: &str, data: &[u8]) -> Self {
        self.files.insert(
            file_id.to_string(),
            RemoteFile {
                data: data.to_vec(),
                remote_path: remote_path.to_string(),
            },
        );
        self
    }

    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    pub async fn actions(&self) -> Vec<Action> {
        self.actions.lock().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.actions()
            .await
            .into_iter()
            .filter_map(|a| match a {
                Action::Text { text, .. } => Some(text),
                Action::Audio { .. } => None,
            })
            .collect()
    }

    pub async fn audio_count(&self) -> usize {
        self.actions()
            .await
            .iter()
            .filter(|a| matches!(a, Action::Audio { .. }))
            .count()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> chat_relay::Result<()> {
        self.actions.lock().await.push(Action::Text {
            chat_id,
            text: text.to_string(),
        });
        if self.fail_text {
            return Err(Error::Transport("send failed".to_string()));
        }
        Ok(())
    }

    async fn send_audio(&self, chat_id: i64, audio_path: &Path) -> chat_relay::Result<()> {
        self.actions.lock().await.push(Action::Audio {
            chat_id,
            path: audio_path.to_path_buf(),
            existed: audio_path.exists(),
        });
        Ok(())
    }

    async fn fetch_file(&self, file_id: &str) -> chat_relay::Result<RemoteFile> {
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("unknown file {file_id}")))
    }
}

/// Mock backend returning a fixed response and recording envelopes
pub struct MockBackend {
    response: BackendResponse,
    envelopes: Mutex<Vec<MessageEnvelope>>,
}

impl MockBackend {
    pub fn new(response: BackendResponse) -> Self {
        Self {
            response,
            envelopes: Mutex::new(Vec::new()),
        }
    }

    pub async fn envelopes(&self) -> Vec<MessageEnvelope> {
        self.envelopes.lock().await.clone()
    }
}

#[async_trait]
impl MessageBackend for MockBackend {
    async fn forward(&self, envelope: &MessageEnvelope) -> BackendResponse {
        self.envelopes.lock().await.push(envelope.clone());
        self.response.clone()
    }
}

/// Speech provider returning fixed audio and counting calls
#[derive(Default)]
pub struct MockSpeech {
    calls: AtomicUsize,
    fail: bool,
}

impl MockSpeech {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for MockSpeech {
    async fn synthesize(&self, text: &str, _voice: &VoiceSelection) -> chat_relay::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Transport("speech service down".to_string()));
        }
        Ok(format!("OggS:{text}").into_bytes())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Transcription provider returning a fixed transcript
pub struct MockStt {
    transcript: Option<String>,
}

impl MockStt {
    pub fn says(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { transcript: None }
    }
}

#[async_trait]
impl TranscriptionProvider for MockStt {
    async fn transcribe(&self, _audio: Vec<u8>, _file_name: &str) -> chat_relay::Result<String> {
        self.transcript
            .clone()
            .ok_or_else(|| Error::Transport("transcription service down".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Successful backend response
pub fn success(message_to_user: Option<&str>, include_voice_message: bool) -> BackendResponse {
    BackendResponse {
        status: BackendStatus::Success,
        message_to_user: message_to_user.map(ToString::to_string),
        include_voice_message,
    }
}

/// Config with storage under `dir`
pub fn test_config(dir: &Path) -> Config {
    Config {
        telegram_token: SecretString::from("123:test".to_string()),
        backend_endpoint: url::Url::parse("http://127.0.0.1:1/endpoint").unwrap(),
        openai_api_key: SecretString::from("sk-test".to_string()),
        voice: VoiceConfig {
            store_dir: dir.join("incoming"),
            outgoing_dir: dir.join("outgoing"),
            ..VoiceConfig::default()
        },
        telegram: TelegramConfig::default(),
    }
}

/// A relay wired to mocks
pub struct Harness {
    pub relay: Arc<InboundRelay>,
    pub platform: Arc<MockPlatform>,
    pub backend: Arc<MockBackend>,
    pub speech: Arc<MockSpeech>,
    pub dir: TempDir,
}

/// Build a relay over mocks; `tweak` adjusts the config first
pub fn harness(
    platform: MockPlatform,
    response: BackendResponse,
    stt: MockStt,
    tweak: impl FnOnce(&mut Config),
) -> Harness {
    harness_with_speech(platform, response, stt, MockSpeech::default(), tweak)
}

/// Like [`harness`] with a chosen speech provider
pub fn harness_with_speech(
    platform: MockPlatform,
    response: BackendResponse,
    stt: MockStt,
    speech: MockSpeech,
    tweak: impl FnOnce(&mut Config),
) -> Harness {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = test_config(dir.path());
    tweak(&mut config);

    let platform = Arc::new(platform);
    let backend = Arc::new(MockBackend::new(response));
    let speech = Arc::new(speech);

    let relay = InboundRelay::new(
        &config,
        platform.clone(),
        backend.clone(),
        Transcriber::new(Arc::new(stt)),
        SpeechSynthesizer::new(speech.clone(), &config.voice),
    );

    Harness {
        relay: Arc::new(relay),
        platform,
        backend,
        speech,
        dir,
    }
}

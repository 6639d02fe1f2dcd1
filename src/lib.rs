//! chat-relay: relay Telegram messages to an HTTP backend
//!
//! Text and voice messages arrive from Telegram, voice is transcribed, the
//! text is POSTed to a backend, and the backend's reply is sent back as text
//! and optionally as synthesized speech.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   InboundEvent   ┌──────────────┐  MessageEnvelope  ┌─────────┐
//! │   Telegram   │ ───────────────► │ InboundRelay │ ────────────────► │ Backend │
//! │   polling    │                  │              │ ◄──────────────── │  (HTTP) │
//! └──────────────┘                  └──────┬───────┘  BackendResponse  └─────────┘
//!        ▲                                 │
//!        │   text / audio replies   ┌──────┴────────────────────────┐
//!        └───────────────────────── │ Transcriber │ SpeechSynthesizer│
//!                                   │   (STT)     │  + ContentCache  │
//!                                   └───────────────────────────────┘
//! ```

pub mod backend;
pub mod channels;
pub mod config;
pub mod error;
pub mod relay;
pub mod voice;

pub use backend::{
    BackendClient, BackendResponse, BackendStatus, FailureReason, MessageBackend, MessageEnvelope,
};
pub use channels::{ChatPlatform, RemoteFile, TelegramChannel};
pub use config::Config;
pub use error::{Error, Result};
pub use relay::{AudioRef, EventKind, EventPayload, InboundEvent, InboundRelay};
pub use voice::{AudioArtifact, CacheKey, ContentCache, SpeechSynthesizer, Transcriber};

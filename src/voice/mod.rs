//! Voice processing
//!
//! Speech-to-text for inbound voice messages and cached text-to-speech for
//! voice replies.

mod cache;
mod stt;
mod synthesizer;
mod transcriber;
mod tts;

pub use cache::{ARTIFACT_EXTENSION, CacheKey, ContentCache};
pub use stt::{OpenAiTranscription, TranscriptionProvider};
pub use synthesizer::{AudioArtifact, SpeechSynthesizer};
pub use transcriber::Transcriber;
pub use tts::{OPENAI_API_BASE, OpenAiSpeech, SpeechProvider, VoiceSelection};

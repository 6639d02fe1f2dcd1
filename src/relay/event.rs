//! Normalized inbound events

/// What kind of message arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Plain text
    Text,
    /// Recorded voice note
    Voice,
}

/// Handle to audio stored on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    /// Platform file identifier
    pub file_id: String,
    /// MIME type reported by the platform
    pub mime_type: Option<String>,
}

impl AudioRef {
    /// Local file name for the downloaded audio
    ///
    /// `audio/mpeg` voice notes are stored as `.m4a`; otherwise the extension
    /// of the platform's file path is kept, falling back to `.oga`.
    #[must_use]
    pub fn local_file_name(&self, remote_path: &str) -> String {
        let ext = if self.mime_type.as_deref() == Some("audio/mpeg") {
            "m4a".to_string()
        } else {
            remote_path
                .rsplit('/')
                .next()
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext)
                .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .unwrap_or("oga")
                .to_string()
        };
        format!("{}.{ext}", sanitize_file_id(&self.file_id))
    }
}

/// Keep file ids safe to use as a file name
fn sanitize_file_id(file_id: &str) -> String {
    file_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// Text message body
    Text(String),
    /// Voice note to download and transcribe
    Voice(AudioRef),
}

/// A single message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the message came from and replies go to
    pub chat_id: i64,
    /// Sender's platform username, if they have one
    pub username: Option<String>,
    /// Message content
    pub payload: EventPayload,
}

impl InboundEvent {
    /// A text message
    #[must_use]
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            username: None,
            payload: EventPayload::Text(text.into()),
        }
    }

    /// A voice message
    #[must_use]
    pub fn voice(chat_id: i64, audio: AudioRef) -> Self {
        Self {
            chat_id,
            username: None,
            payload: EventPayload::Voice(audio),
        }
    }

    /// Attach the sender's username
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Kind of the payload
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Text(_) => EventKind::Text,
            EventPayload::Voice(_) => EventKind::Voice,
        }
    }

    /// Text body, for text events
    #[must_use]
    pub fn text_body(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Text(text) => Some(text),
            EventPayload::Voice(_) => None,
        }
    }

    /// Audio handle, for voice events
    #[must_use]
    pub const fn audio_ref(&self) -> Option<&AudioRef> {
        match &self.payload {
            EventPayload::Voice(audio) => Some(audio),
            EventPayload::Text(_) => None,
        }
    }

    /// Whether the sender has a non-empty username
    #[must_use]
    pub fn has_username(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

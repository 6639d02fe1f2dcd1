//! Backend client
//!
//! Every relayed message is POSTed to the configured endpoint as
//! `{"message": ..., "chat_id": ...}`. The backend may answer with text for the
//! user and ask for it to be spoken as well:
//!
//! ```json
//! {"status": "success", "messageToUser": "hi there", "includeVoiceMessage": true}
//! ```

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;

/// Normalized unit sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEnvelope {
    message: String,
    chat_id: i64,
}

impl MessageEnvelope {
    /// Build an envelope for `message` from `chat_id`
    #[must_use]
    pub fn new(message: impl Into<String>, chat_id: i64) -> Self {
        Self {
            message: message.into(),
            chat_id,
        }
    }

    /// Message text
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Originating chat
    #[must_use]
    pub const fn chat_id(&self) -> i64 {
        self.chat_id
    }
}

/// Why a backend call did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Backend answered with a status other than 200
    Status(u16),
    /// Body was not the expected JSON
    Malformed(String),
    /// Request never got an answer
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "Backend response had status {code}"),
            Self::Malformed(e) => write!(f, "Backend response could not be read: {e}"),
            Self::Transport(e) => write!(f, "Backend could not be reached: {e}"),
        }
    }
}

/// Outcome of a backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    /// HTTP 200 with a parseable body
    Success,
    /// Anything else
    Failure(FailureReason),
}

/// Interpreted backend response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    /// Success or failure
    pub status: BackendStatus,
    /// Text to send back to the user, if any
    pub message_to_user: Option<String>,
    /// Also speak `message_to_user` as a voice reply
    pub include_voice_message: bool,
}

/// JSON body as the backend sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    message_to_user: Option<String>,
    #[serde(default)]
    include_voice_message: Option<bool>,
}

impl BackendResponse {
    /// A failed call with no reply content
    #[must_use]
    pub const fn failure(reason: FailureReason) -> Self {
        Self {
            status: BackendStatus::Failure(reason),
            message_to_user: None,
            include_voice_message: false,
        }
    }

    /// Whether the call succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, BackendStatus::Success)
    }

    /// Interpret the body of a 200 response
    ///
    /// An empty `messageToUser` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not a JSON object of the expected shape
    pub fn from_body(body: &str) -> serde_json::Result<Self> {
        let wire: WireResponse = serde_json::from_str(body)?;

        if wire.status.as_deref() != Some("success") {
            tracing::debug!(status = ?wire.status, "backend body status is not \"success\"");
        }
        if let Some(message) = &wire.message {
            tracing::debug!(ack = %message, "backend acknowledgement");
        }

        Ok(Self {
            status: BackendStatus::Success,
            message_to_user: wire.message_to_user.filter(|m| !m.is_empty()),
            include_voice_message: wire.include_voice_message.unwrap_or(false),
        })
    }
}

/// Destination for message envelopes
#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// Deliver `envelope`; failures are reported in the response, never raised
    async fn forward(&self, envelope: &MessageEnvelope) -> BackendResponse;
}

/// HTTP POST backend
pub struct BackendClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl BackendClient {
    /// Create a client for the configured endpoint
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_endpoint(config.backend_endpoint.clone())
    }

    /// Create a client for `endpoint`
    #[must_use]
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Endpoint this client posts to
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MessageBackend for BackendClient {
    async fn forward(&self, envelope: &MessageEnvelope) -> BackendResponse {
        tracing::info!(chat_id = envelope.chat_id(), "forwarding message to backend");

        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(envelope)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "error forwarding message to backend");
                return BackendResponse::failure(FailureReason::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "backend returned non-success status");
            return BackendResponse::failure(FailureReason::Status(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read backend response");
                return BackendResponse::failure(FailureReason::Transport(e.to_string()));
            }
        };

        match BackendResponse::from_body(&body) {
            Ok(parsed) => {
                tracing::info!(
                    has_reply = parsed.message_to_user.is_some(),
                    voice = parsed.include_voice_message,
                    "successfully forwarded message to backend"
                );
                parsed
            }
            Err(e) => {
                tracing::warn!(error = %e, "backend response is not valid JSON");
                BackendResponse::failure(FailureReason::Malformed(e.to_string()))
            }
        }
    }
}

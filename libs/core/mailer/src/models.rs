//! Message model types shared by every sender

use serde::{Deserialize, Serialize};

/// Delivery priority for an outgoing message.
///
/// How priority reaches the recipient is transport-specific; the SendGrid
/// sender maps it onto the conventional priority header pairs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// Raw attachment bytes; transports encode as needed.
    pub data: Vec<u8>,
    pub content_type: String,
    /// Inline attachments are referenced from the body via `content_id`.
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub content_id: Option<String>,
}

/// Result of a single send attempt.
///
/// An attempt is successful iff `error_messages` is empty; transports never
/// report failure through `Err`.
#[derive(Debug, Clone, Default)]
pub struct SendResult {
    /// Provider-assigned message id, when one was returned.
    pub message_id: Option<String>,
    pub error_messages: Vec<String>,
}

impl SendResult {
    pub fn successful(&self) -> bool {
        self.error_messages.is_empty()
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message_id: None,
            error_messages: vec![message.into()],
        }
    }
}

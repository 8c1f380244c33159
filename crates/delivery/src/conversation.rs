//! The outbound conversation seam.
//!
//! [`Conversation`] is the one capability the publisher needs: send a
//! single message and report whether the platform accepted it.

use std::future::Future;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Message shape
// ---------------------------------------------------------------------------

/// Markdown text object inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// A layout block. Only markdown sections are produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextObject,
}

impl Block {
    pub fn mrkdwn_section(text: impl Into<String>) -> Self {
        Self {
            kind: "section",
            text: TextObject {
                kind: "mrkdwn",
                text: text.into(),
            },
        }
    }
}

/// One message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Notification fallback shown where blocks are not rendered.
    pub text: String,
    pub blocks: Vec<Block>,
    pub mrkdwn: bool,
}

/// Platform acknowledgement of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryAck {
    /// Timestamp id of the posted message, when the platform returns one.
    pub ts: Option<String>,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Conversation API returned HTTP {0}")]
    HttpStatus(u16),

    /// The platform answered but refused the message.
    #[error("Conversation API rejected message: {0}")]
    Rejected(String),

    #[error("No bot token configured")]
    MissingToken,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Sends messages to a chat platform.
pub trait Conversation: Send + Sync {
    fn send(
        &self,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<DeliveryAck, ConversationError>> + Send;
}

//! Composition of the answer message.

use assist_core::DeliveryMode;
use serde::{Deserialize, Serialize};

use crate::conversation::{Block, OutboundMessage};

/// Notification fallback text.
pub const FALLBACK_TEXT: &str = "AI Response for Priority Request";

/// Disclaimer placed in front of every generated answer.
pub const CAUTION_TEXT: &str = "Please proceed with caution: the following text was generated by an AI model trained on Knowledge Base articles";

/// Header above the submitter's own words when replying in thread.
pub const THREAD_CONTEXT_HEADER: &str = "*Original Context from Submitter:*\n";

/// Header used when answers are redirected to the fallback identity.
pub const DIRECT_CONTEXT_HEADER: &str = "original text from the agent about the escalation\n";

/// The escalation message an answer replies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    pub channel: String,
    pub message_ts: String,
}

/// Where one message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    Thread { channel: String, thread_ts: String },
    Direct { channel: String },
}

impl DeliveryTarget {
    /// Pick the target for `thread` under the configured mode.
    pub fn resolve(mode: &DeliveryMode, thread: &ThreadRef) -> Self {
        match mode {
            DeliveryMode::Thread => Self::Thread {
                channel: thread.channel.clone(),
                thread_ts: thread.message_ts.clone(),
            },
            DeliveryMode::Direct { fallback_channel } => Self::Direct {
                channel: fallback_channel.clone(),
            },
        }
    }

    fn context_header(&self) -> &'static str {
        match self {
            Self::Thread { .. } => THREAD_CONTEXT_HEADER,
            Self::Direct { .. } => DIRECT_CONTEXT_HEADER,
        }
    }
}

/// Build the answer message: submitter context first, then the
/// disclaimed AI content.
pub fn compose(target: &DeliveryTarget, original_context: &str, content: &str) -> OutboundMessage {
    let (channel, thread_ts) = match target {
        DeliveryTarget::Thread { channel, thread_ts } => (channel.clone(), Some(thread_ts.clone())),
        DeliveryTarget::Direct { channel } => (channel.clone(), None),
    };

    OutboundMessage {
        channel,
        thread_ts,
        text: FALLBACK_TEXT.to_string(),
        blocks: vec![
            Block::mrkdwn_section(format!("{}{}", target.context_header(), original_context)),
            Block::mrkdwn_section(format!("*{CAUTION_TEXT}*: \n{content}")),
        ],
        mrkdwn: true,
    }
}

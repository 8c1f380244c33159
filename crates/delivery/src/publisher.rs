//! Turns a poll outcome into at most one delivered message.
//!
//! Only [`PollOutcome::Resolved`] is ever sent. Every other outcome, and a
//! job that was never created, produces a non-success [`PublishReport`]
//! without touching the conversation. Failures are reported, not announced
//! to the channel.

use assist_core::outcome::REASON_NOT_CREATED;
use assist_core::{AnswerId, DeliveryMode, PollOutcome};
use serde::Serialize;

use crate::conversation::Conversation;
use crate::message::{compose, DeliveryTarget, ThreadRef};

/// Result of one publish step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<AnswerId>,
}

impl PublishReport {
    fn failure(reason: impl Into<String>, answer_id: Option<AnswerId>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            content: None,
            answer_id,
        }
    }
}

pub struct ResultPublisher<C> {
    conversation: C,
    mode: DeliveryMode,
}

impl<C: Conversation> ResultPublisher<C> {
    pub fn new(conversation: C, mode: DeliveryMode) -> Self {
        Self { conversation, mode }
    }

    /// Report for a run whose job was never created.
    pub fn not_created(&self) -> PublishReport {
        tracing::info!("Job was not created, nothing to publish");
        PublishReport::failure(REASON_NOT_CREATED, None)
    }

    /// Deliver a resolved answer to `thread`, or report why not.
    ///
    /// `original_context` is the submitter's free text, quoted above the
    /// answer.
    pub async fn publish(
        &self,
        outcome: &PollOutcome,
        thread: &ThreadRef,
        original_context: &str,
    ) -> PublishReport {
        let PollOutcome::Resolved { answer_id, content } = outcome else {
            let reason = outcome.failure_reason().unwrap_or_default();
            tracing::info!(%reason, "Nothing to publish");
            return PublishReport::failure(reason, outcome.answer_id().cloned());
        };

        let target = DeliveryTarget::resolve(&self.mode, thread);
        let message = compose(&target, original_context, content);

        match self.conversation.send(&message).await {
            Ok(ack) => {
                tracing::info!(
                    %answer_id,
                    channel = %message.channel,
                    ts = ack.ts.as_deref().unwrap_or(""),
                    "Answer delivered",
                );
                PublishReport {
                    success: true,
                    reason: None,
                    content: Some(content.clone()),
                    answer_id: Some(answer_id.clone()),
                }
            }
            Err(e) => {
                tracing::error!(
                    %answer_id,
                    channel = %message.channel,
                    error = %e,
                    "Answer delivery failed",
                );
                PublishReport {
                    success: false,
                    reason: Some(e.to_string()),
                    content: Some(content.clone()),
                    answer_id: Some(answer_id.clone()),
                }
            }
        }
    }
}

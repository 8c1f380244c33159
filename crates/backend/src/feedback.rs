//! Reviewer votes on published answers.
//!
//! Vote failures never propagate: the recorder logs them and reports a
//! [`FeedbackReport::Failed`], so a broken vote endpoint cannot break the
//! surrounding workflow.

use assist_core::feedback::VoteRequest;
use assist_core::AnswerId;
use serde::Serialize;

use crate::api::BackendApi;

/// What happened to one vote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FeedbackReport {
    /// No answer id was available, so no request was made.
    Skipped,
    Recorded,
    Removed,
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct FeedbackRecorder {
    api: BackendApi,
}

impl FeedbackRecorder {
    pub fn new(api: BackendApi) -> Self {
        Self { api }
    }

    /// Post a vote for `answer_id`.
    ///
    /// `"Good"` and `"Bad"` map to the thumbs emoji; any other feedback is
    /// forwarded as the emoji name unchanged.
    pub async fn record(
        &self,
        answer_id: Option<&AnswerId>,
        feedback: &str,
        comment: Option<&str>,
    ) -> FeedbackReport {
        let Some(answer_id) = answer_id else {
            tracing::debug!("No answer id, skipping vote");
            return FeedbackReport::Skipped;
        };

        let vote = VoteRequest::from_feedback(feedback, comment);
        match self.api.post_vote(answer_id, &vote).await {
            Ok(()) => {
                tracing::info!(%answer_id, emoji = %vote.emoji, "Vote recorded");
                FeedbackReport::Recorded
            }
            Err(e) => {
                tracing::warn!(%answer_id, emoji = %vote.emoji, error = %e, "Failed to record vote");
                FeedbackReport::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Delete the vote for `answer_id`.
    pub async fn remove(&self, answer_id: Option<&AnswerId>) -> FeedbackReport {
        let Some(answer_id) = answer_id else {
            tracing::debug!("No answer id, skipping vote removal");
            return FeedbackReport::Skipped;
        };

        match self.api.delete_vote(answer_id).await {
            Ok(()) => {
                tracing::info!(%answer_id, "Vote removed");
                FeedbackReport::Removed
            }
            Err(e) => {
                tracing::warn!(%answer_id, error = %e, "Failed to remove vote");
                FeedbackReport::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_result_tag() {
        let removed = serde_json::to_value(FeedbackReport::Removed).unwrap();
        let recorded = serde_json::to_value(FeedbackReport::Recorded).unwrap();
        let failed = serde_json::to_value(FeedbackReport::Failed {
            error: "boom".to_string(),
        })
        .unwrap();

        assert_eq!(removed, serde_json::json!({ "result": "removed" }));
        assert_eq!(recorded, serde_json::json!({ "result": "recorded" }));
        assert_eq!(failed, serde_json::json!({ "result": "failed", "error": "boom" }));
    }
}

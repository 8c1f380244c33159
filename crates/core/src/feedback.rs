//! Reviewer vote vocabulary.

use serde::Serialize;

/// Form answers with a fixed emoji. Anything else is forwarded as-is so the
/// backend can accept new emoji without a client release.
const FEEDBACK_EMOJI: &[(&str, &str)] = &[("Good", "thumbup"), ("Bad", "thumbdown")];

/// Emoji sent to the backend for a reviewer's feedback answer.
pub fn emoji_for(feedback: &str) -> &str {
    FEEDBACK_EMOJI
        .iter()
        .find(|(answer, _)| *answer == feedback)
        .map_or(feedback, |(_, emoji)| *emoji)
}

/// Body of `POST /answers/{id}/owner-vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteRequest {
    pub emoji: String,
    /// Serialized as `null` when absent.
    pub comment: Option<String>,
}

impl VoteRequest {
    pub fn from_feedback(feedback: &str, comment: Option<&str>) -> Self {
        Self {
            emoji: emoji_for(feedback).to_string(),
            comment: comment.map(str::to_string),
        }
    }
}

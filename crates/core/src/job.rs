//! Backend identifiers and the job-status response shape.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

opaque_id!(
    /// Backend-assigned job handle. The only value the poller needs.
    JobId
);

opaque_id!(
    /// Backend-assigned answer handle, used to attach reviewer votes.
    AnswerId
);

opaque_id!(
    /// Backend user id for the submitter, sent as the `X-User-Id` actor header.
    BackendUserId
);

/// Job lifecycle status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Any status string the client does not recognise, kept verbatim.
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            // "precessing" is a known backend misspelling.
            "processing" | "precessing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the poller should wait and ask again.
    ///
    /// Only `processing` qualifies; `pending` goes to answer extraction like
    /// any other non-failed status.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// Body of `GET /jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobView {
    #[serde(default)]
    pub id: Option<JobId>,
    /// Raw status string; see [`JobView::status`].
    #[serde(rename = "status")]
    pub raw_status: String,
    #[serde(default)]
    pub answer: Option<AnswerView>,
}

impl JobView {
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.raw_status)
    }
}

/// The `answer` object of a job. Only meaningful once the job completed.
///
/// Every field is optional on the wire; the poller decides what a missing
/// field means.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    #[serde(default)]
    pub id: Option<AnswerId>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub has_resolution: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misspelled_processing_is_processing() {
        assert_eq!(JobStatus::parse("precessing"), JobStatus::Processing);
        assert_eq!(JobStatus::parse("processing"), JobStatus::Processing);
        assert!(JobStatus::parse("precessing").is_in_progress());
    }

    #[test]
    fn pending_is_not_in_progress() {
        assert_eq!(JobStatus::parse("pending"), JobStatus::Pending);
        assert!(!JobStatus::parse("pending").is_in_progress());
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        assert_eq!(
            JobStatus::parse("archived"),
            JobStatus::Other("archived".to_string())
        );
        assert!(!JobStatus::parse("archived").is_in_progress());
        assert!(!JobStatus::parse("failed").is_in_progress());
    }

    #[test]
    fn job_view_parses_completed_answer() {
        let view: JobView = serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "status": "completed",
            "answer": {"id": "ans-9", "content": "Void it from the order screen", "hasResolution": true}
        }))
        .unwrap();

        assert_eq!(view.status(), JobStatus::Completed);
        let answer = view.answer.unwrap();
        assert_eq!(answer.id, Some(AnswerId::new("ans-9")));
        assert_eq!(answer.has_resolution, Some(true));
    }

    #[test]
    fn job_view_tolerates_missing_answer() {
        let view: JobView =
            serde_json::from_value(serde_json::json!({"status": "processing"})).unwrap();
        assert!(view.answer.is_none());
        assert!(view.id.is_none());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = JobId::new("abc");
        assert_eq!(serde_json::to_value(&id).unwrap(), "abc");
        assert_eq!(id.to_string(), "abc");
    }
}

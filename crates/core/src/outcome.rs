//! Terminal classifications produced by the job poller.
//!
//! Every way a polled job can end is a variant of [`PollOutcome`]; none of
//! them is an error type. The reason strings are what the surrounding
//! workflow shows to the submitter when it wires a failure branch.

use crate::job::AnswerId;

/// Reason reported when the attempt budget ran out while still processing.
pub const REASON_PROCESSING_TIMEOUT: &str = "Processing Timeout";
/// Reason reported when the job completed without a usable resolution.
pub const REASON_NO_RESOLUTION: &str = "No Resolution";
/// Reason reported when a status request failed.
pub const REASON_FETCH_ERROR: &str = "Error in fetching answer";
/// Reason reported when a completed job carried an unusable answer object.
pub const REASON_FINAL_DATA: &str = "Error in final data handling";
/// Reason reported when no job was created upstream.
pub const REASON_NOT_CREATED: &str = "Job was not created";

/// Why a status request did not yield a usable job view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The status endpoint answered with a non-2xx code.
    HttpStatus(u16),
    /// Network, timeout or body-decoding failure.
    Transport(String),
    /// The job reported completion but the answer was missing or incomplete.
    MissingAnswer,
}

/// How a polled job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Completed with a usable answer.
    Resolved { answer_id: AnswerId, content: String },
    /// Completed, but the backend found nothing useful. Votes can still be recorded.
    NoResolution { answer_id: AnswerId },
    /// The backend reported the job as failed; `status` is the raw string.
    Failed { status: String },
    /// Still processing after the last allowed attempt.
    TimedOut,
    FetchFailed(FetchFailure),
}

impl PollOutcome {
    /// Answer id, for the outcomes that carry one.
    pub fn answer_id(&self) -> Option<&AnswerId> {
        match self {
            Self::Resolved { answer_id, .. } | Self::NoResolution { answer_id } => Some(answer_id),
            _ => None,
        }
    }

    /// Human-readable reason for a non-resolved outcome.
    ///
    /// `None` for [`PollOutcome::Resolved`].
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Resolved { .. } => None,
            Self::NoResolution { .. } => Some(REASON_NO_RESOLUTION),
            Self::Failed { status } => Some(status),
            Self::TimedOut => Some(REASON_PROCESSING_TIMEOUT),
            Self::FetchFailed(FetchFailure::MissingAnswer) => Some(REASON_FINAL_DATA),
            Self::FetchFailed(_) => Some(REASON_FETCH_ERROR),
        }
    }
}

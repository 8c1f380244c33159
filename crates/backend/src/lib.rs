//! Backend-facing half of the escalation job lifecycle.
//!
//! - [`api`]: the REST client shared by every component below.
//! - [`identity`]: [`IdentityResolver`], submitter to backend user id.
//! - [`submit`]: [`JobSubmitter`], creates a job from a sanitized context.
//! - [`poller`]: [`JobPoller`], bounded-retry status polling.
//! - [`feedback`]: [`FeedbackRecorder`], reviewer votes on answers.

pub mod api;
pub mod feedback;
pub mod identity;
pub mod poller;
pub mod submit;

pub use api::{BackendApi, BackendApiError};
pub use feedback::{FeedbackRecorder, FeedbackReport};
pub use identity::{IdentityError, IdentityResolver};
pub use poller::{JobPoller, JobStatusSource, Sleeper, TokioSleeper};
pub use submit::{JobSubmitter, SubmissionError};

//! Domain types for the escalation assist job client.
//!
//! Pure data and transforms with no I/O:
//!
//! - [`config`]: [`AssistConfig`], resolved once at startup.
//! - [`intake`]: raw form records and the [`normalize`] transform.
//! - [`context`]: sanitized [`EscalationContext`] per workflow variant.
//! - [`job`]: backend identifiers and the job-status response shape.
//! - [`outcome`]: terminal [`PollOutcome`] classifications.
//! - [`feedback`]: reviewer vote vocabulary.

pub mod config;
pub mod context;
pub mod error;
pub mod feedback;
pub mod intake;
pub mod job;
pub mod outcome;

pub use config::{AssistConfig, DeliveryMode, Environment, PollSettings};
pub use context::{ContextKey, EscalationContext, WorkflowVariant};
pub use error::{ConfigError, ValidationError};
pub use intake::{normalize, IntakeRecord, NormalizedIntake, Submitter};
pub use job::{AnswerId, BackendUserId, JobId, JobStatus, JobView};
pub use outcome::{FetchFailure, PollOutcome};

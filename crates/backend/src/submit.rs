//! Job creation.

use assist_core::{BackendUserId, ContextKey, EscalationContext, JobId, ValidationError};

use crate::api::{BackendApi, BackendApiError};

/// Why a job was not created.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The context failed local checks; nothing was sent.
    #[error("Context not submittable: {0}")]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-2xx status.
    #[error("Job rejected by backend ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The request never produced a usable response.
    #[error("Job submission failed: {0}")]
    Transport(#[source] BackendApiError),
}

impl From<BackendApiError> for SubmissionError {
    fn from(err: BackendApiError) -> Self {
        match err {
            BackendApiError::ApiError { status, body } => Self::Rejected { status, body },
            other => Self::Transport(other),
        }
    }
}

/// Creates backend jobs from sanitized escalation contexts.
#[derive(Debug, Clone)]
pub struct JobSubmitter {
    api: BackendApi,
    context_key: ContextKey,
}

impl JobSubmitter {
    /// `context_key` is the top-level key the context is wrapped under in
    /// the request body.
    pub fn new(api: BackendApi, context_key: ContextKey) -> Self {
        Self { api, context_key }
    }

    /// Create a job for `context` and return its id.
    ///
    /// A context with blank free text is refused without contacting the
    /// backend.
    pub async fn submit(
        &self,
        context: &EscalationContext,
        actor: Option<&BackendUserId>,
    ) -> Result<JobId, SubmissionError> {
        if let Err(e) = context.ensure_submittable() {
            tracing::warn!(
                variant = context.variant().as_str(),
                error = %e,
                "Skipping job submission",
            );
            return Err(e.into());
        }

        let body = context.request_body(self.context_key);
        match self.api.create_job(body, actor).await {
            Ok(job_id) => {
                tracing::info!(
                    %job_id,
                    variant = context.variant().as_str(),
                    key = self.context_key.as_str(),
                    "Job created",
                );
                Ok(job_id)
            }
            Err(e) => {
                tracing::error!(
                    variant = context.variant().as_str(),
                    error = %e,
                    "Job creation failed",
                );
                Err(e.into())
            }
        }
    }
}

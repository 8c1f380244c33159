//! The escalation workflow: intake to delivered answer.
//!
//! Two steps, matching how the surrounding automation calls them:
//!
//! 1. [`Workflow::submit`] normalizes the intake, resolves the submitter
//!    (when the form carried one) and creates the job.
//! 2. [`Workflow::post`] polls the job and publishes the result. It
//!    short-circuits when step 1 reported a creation failure, without ever
//!    calling the status endpoint.
//!
//! [`Workflow::run`] chains both and returns a [`RunReport`].

use assist_backend::{
    BackendApi, IdentityResolver, JobPoller, JobSubmitter, Sleeper, TokioSleeper,
};
use assist_core::{
    normalize, AssistConfig, BackendUserId, IntakeRecord, JobId, WorkflowVariant,
};
use assist_delivery::{Conversation, PublishReport, ResultPublisher, ThreadRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of the submit step.
///
/// `string_is_created_failure` mirrors `is_created_failure` as `"true"` /
/// `"false"` for callers that only pass strings between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub actor: Option<BackendUserId>,
    #[serde(default)]
    pub is_created_failure: bool,
    #[serde(default)]
    pub string_is_created_failure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Submitter's free text, quoted above the published answer.
    #[serde(default)]
    pub original_context: String,
}

impl SubmitOutcome {
    fn created(job_id: JobId, actor: Option<BackendUserId>, original_context: String) -> Self {
        Self {
            job_id: Some(job_id),
            actor,
            is_created_failure: false,
            string_is_created_failure: "false".to_string(),
            failure: None,
            original_context,
        }
    }

    fn not_created(failure: impl ToString) -> Self {
        Self {
            job_id: None,
            actor: None,
            is_created_failure: true,
            string_is_created_failure: "true".to_string(),
            failure: Some(failure.to_string()),
            original_context: String::new(),
        }
    }

    /// Whether the job must be treated as never created.
    ///
    /// Either flag form counts; a missing job id does too.
    pub fn created_failure(&self) -> bool {
        self.is_created_failure
            || self.string_is_created_failure == "true"
            || self.job_id.is_none()
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub variant: &'static str,
    pub submission: SubmitOutcome,
    pub publish: PublishReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Workflow<C, Z = TokioSleeper> {
    variant: WorkflowVariant,
    resolver: IdentityResolver,
    submitter: JobSubmitter,
    poller: JobPoller<BackendApi, Z>,
    publisher: ResultPublisher<C>,
}

impl<C: Conversation> Workflow<C> {
    pub fn new(config: &AssistConfig, api: BackendApi, conversation: C) -> Self {
        Self::with_sleeper(config, api, conversation, TokioSleeper)
    }
}

impl<C: Conversation, Z: Sleeper> Workflow<C, Z> {
    pub fn with_sleeper(config: &AssistConfig, api: BackendApi, conversation: C, sleeper: Z) -> Self {
        Self {
            variant: config.variant,
            resolver: IdentityResolver::new(api.clone()),
            submitter: JobSubmitter::new(api.clone(), config.context_key),
            poller: JobPoller::with_sleeper(api, sleeper, config.poll),
            publisher: ResultPublisher::new(conversation, config.delivery_mode.clone()),
        }
    }

    /// Normalize, resolve identity, create the job.
    ///
    /// Every failure is folded into a [`SubmitOutcome`] with
    /// `is_created_failure` set; nothing is raised.
    pub async fn submit(&self, record: &IntakeRecord) -> SubmitOutcome {
        let intake = match normalize(record, self.variant) {
            Ok(intake) => intake,
            Err(e) => {
                tracing::warn!(variant = self.variant.as_str(), error = %e, "Intake rejected");
                return SubmitOutcome::not_created(e);
            }
        };

        let actor = match &intake.submitter {
            Some(submitter) => match self.resolver.resolve(submitter).await {
                Ok(user_id) => Some(user_id),
                Err(e) => return SubmitOutcome::not_created(e),
            },
            None => None,
        };

        match self.submitter.submit(&intake.context, actor.as_ref()).await {
            Ok(job_id) => {
                SubmitOutcome::created(job_id, actor, intake.context.free_text().to_string())
            }
            Err(e) => SubmitOutcome::not_created(e),
        }
    }

    /// Poll the submitted job and publish the outcome to `thread`.
    pub async fn post(&self, submission: &SubmitOutcome, thread: &ThreadRef) -> PublishReport {
        let job_id = match &submission.job_id {
            Some(job_id) if !submission.created_failure() => job_id,
            _ => return self.publisher.not_created(),
        };

        let outcome = self.poller.poll(job_id, submission.actor.as_ref()).await;
        self.publisher
            .publish(&outcome, thread, &submission.original_context)
            .await
    }

    pub async fn run(&self, record: &IntakeRecord, thread: &ThreadRef) -> RunReport {
        let started_at = Utc::now();
        let submission = self.submit(record).await;
        let publish = self.post(&submission, thread).await;

        tracing::info!(
            variant = self.variant.as_str(),
            job_id = submission.job_id.as_ref().map(JobId::as_str).unwrap_or(""),
            success = publish.success,
            reason = publish.reason.as_deref().unwrap_or(""),
            "Workflow run finished",
        );

        RunReport {
            variant: self.variant.as_str(),
            submission,
            publish,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

//! Bounded-retry job status poller.
//!
//! [`JobPoller::poll`] requests the status of one job up to
//! [`PollSettings::max_attempts`] times, pausing a fixed delay between
//! attempts, and classifies the result into a [`PollOutcome`].
//!
//! Each attempt's response is turned into a [`Transition`] by the pure
//! [`classify_attempt`] function; the loop in [`JobPoller::poll`] only
//! decides whether to sleep and try again. The pause goes through a
//! [`Sleeper`] so tests can run the full state machine without waiting.

use std::future::Future;
use std::time::Duration;

use assist_core::{
    BackendUserId, FetchFailure, JobId, JobStatus, JobView, PollOutcome, PollSettings,
};

use crate::api::{BackendApi, BackendApiError};

/// Anything that can report the status of a job.
pub trait JobStatusSource: Send + Sync {
    fn fetch_job(
        &self,
        job_id: &JobId,
        actor: Option<&BackendUserId>,
    ) -> impl Future<Output = Result<JobView, BackendApiError>> + Send;
}

impl JobStatusSource for BackendApi {
    async fn fetch_job(
        &self,
        job_id: &JobId,
        actor: Option<&BackendUserId>,
    ) -> Result<JobView, BackendApiError> {
        self.get_job(job_id, actor).await
    }
}

/// Pause between poll attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real-time sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What to do after one status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still processing and budget remains: pause, then poll again.
    Retry,
    /// Stop polling with this classification.
    Done(PollOutcome),
}

/// Classify one status response.
///
/// `attempt` is 1-based. A processing-equivalent status on the final
/// attempt is [`PollOutcome::TimedOut`], never a retry.
pub fn classify_attempt(view: &JobView, attempt: u32, max_attempts: u32) -> Transition {
    match view.status() {
        status if status.is_in_progress() => {
            if attempt < max_attempts {
                Transition::Retry
            } else {
                Transition::Done(PollOutcome::TimedOut)
            }
        }
        JobStatus::Failed => Transition::Done(PollOutcome::Failed {
            status: view.raw_status.clone(),
        }),
        // Completed, pending and anything unrecognised go to answer extraction.
        _ => Transition::Done(extract_answer(view)),
    }
}

/// Turn a completed job's answer into a terminal classification.
pub fn extract_answer(view: &JobView) -> PollOutcome {
    let Some(answer) = &view.answer else {
        return PollOutcome::FetchFailed(FetchFailure::MissingAnswer);
    };
    let Some(answer_id) = answer.id.clone() else {
        return PollOutcome::FetchFailed(FetchFailure::MissingAnswer);
    };

    if answer.has_resolution != Some(true) {
        return PollOutcome::NoResolution { answer_id };
    }

    match &answer.content {
        Some(content) => PollOutcome::Resolved {
            answer_id,
            content: content.clone(),
        },
        None => PollOutcome::FetchFailed(FetchFailure::MissingAnswer),
    }
}

fn fetch_failure(err: &BackendApiError) -> FetchFailure {
    match err {
        BackendApiError::ApiError { status, .. } => FetchFailure::HttpStatus(*status),
        BackendApiError::Request(e) => FetchFailure::Transport(e.to_string()),
    }
}

/// Polls one backend for job completion.
pub struct JobPoller<S, Z = TokioSleeper> {
    source: S,
    sleeper: Z,
    settings: PollSettings,
}

impl<S: JobStatusSource, Z: Sleeper> JobPoller<S, Z> {
    pub fn with_sleeper(source: S, sleeper: Z, settings: PollSettings) -> Self {
        Self {
            source,
            sleeper,
            settings,
        }
    }

    /// Poll `job_id` until it reaches a terminal classification or the
    /// attempt budget runs out.
    ///
    /// Any failed request ends polling immediately; only processing
    /// statuses consume further attempts.
    pub async fn poll(&self, job_id: &JobId, actor: Option<&BackendUserId>) -> PollOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::info!(%job_id, attempt, max_attempts, "Fetching job status");

            let view = match self.source.fetch_job(job_id, actor).await {
                Ok(view) => view,
                Err(e) => {
                    tracing::error!(%job_id, attempt, error = %e, "Job status request failed");
                    return PollOutcome::FetchFailed(fetch_failure(&e));
                }
            };

            match classify_attempt(&view, attempt, max_attempts) {
                Transition::Retry => {
                    tracing::info!(
                        %job_id,
                        attempt,
                        status = %view.raw_status,
                        delay_ms = self.settings.delay.as_millis() as u64,
                        "Backend still processing, waiting before next attempt",
                    );
                    self.sleeper.sleep(self.settings.delay).await;
                }
                Transition::Done(outcome) => {
                    match &outcome {
                        PollOutcome::TimedOut => tracing::warn!(
                            %job_id,
                            attempt,
                            "Reached maximum attempts while still processing",
                        ),
                        PollOutcome::Failed { status } => {
                            tracing::warn!(%job_id, attempt, %status, "Job has failed")
                        }
                        other => tracing::info!(
                            %job_id,
                            attempt,
                            status = %view.raw_status,
                            reason = other.failure_reason().unwrap_or("resolved"),
                            "Job reached a terminal state",
                        ),
                    }
                    return outcome;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use assist_core::job::AnswerView;
    use assist_core::AnswerId;

    use super::*;

    /// Replays a fixed sequence of responses and counts calls.
    struct Scripted {
        responses: Mutex<VecDeque<Result<JobView, BackendApiError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<JobView, BackendApiError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl JobStatusSource for Scripted {
        async fn fetch_job(
            &self,
            _job_id: &JobId,
            _actor: Option<&BackendUserId>,
        ) -> Result<JobView, BackendApiError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("poller asked for more responses than scripted")
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn status(raw: &str) -> Result<JobView, BackendApiError> {
        Ok(JobView {
            id: Some(JobId::new("job-1")),
            raw_status: raw.to_string(),
            answer: None,
        })
    }

    fn completed(content: &str, has_resolution: bool) -> Result<JobView, BackendApiError> {
        Ok(JobView {
            id: Some(JobId::new("job-1")),
            raw_status: "completed".to_string(),
            answer: Some(AnswerView {
                id: Some(AnswerId::new("ans-1")),
                content: Some(content.to_string()),
                has_resolution: Some(has_resolution),
            }),
        })
    }

    fn http_error(code: u16) -> Result<JobView, BackendApiError> {
        Err(BackendApiError::ApiError {
            status: code,
            body: "nope".to_string(),
        })
    }

    fn settings() -> PollSettings {
        PollSettings {
            max_attempts: 3,
            delay: Duration::from_millis(5_000),
        }
    }

    fn poller(
        responses: Vec<Result<JobView, BackendApiError>>,
    ) -> JobPoller<Scripted, RecordingSleeper> {
        JobPoller::with_sleeper(
            Scripted::new(responses),
            RecordingSleeper::default(),
            settings(),
        )
    }

    fn sleeps(poller: &JobPoller<Scripted, RecordingSleeper>) -> Vec<Duration> {
        poller.sleeper.sleeps.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn resolves_on_second_attempt() {
        let poller = poller(vec![status("processing"), completed("X", true)]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(
            outcome,
            PollOutcome::Resolved {
                answer_id: AnswerId::new("ans-1"),
                content: "X".to_string(),
            }
        );
        assert_eq!(poller.source.calls(), 2);
        assert_eq!(sleeps(&poller), vec![Duration::from_millis(5_000)]);
    }

    #[tokio::test]
    async fn times_out_after_three_processing_attempts() {
        let poller = poller(vec![
            status("processing"),
            status("precessing"),
            status("processing"),
        ]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(poller.source.calls(), 3);
        // No pause after the final attempt.
        assert_eq!(sleeps(&poller).len(), 2);
    }

    #[tokio::test]
    async fn failed_status_stops_immediately() {
        let poller = poller(vec![status("failed")]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(
            outcome,
            PollOutcome::Failed {
                status: "failed".to_string()
            }
        );
        assert_eq!(poller.source.calls(), 1);
        assert!(sleeps(&poller).is_empty());
    }

    #[tokio::test]
    async fn failed_after_processing_consumes_no_further_attempts() {
        let poller = poller(vec![status("precessing"), status("failed")]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_matches!(outcome, PollOutcome::Failed { .. });
        assert_eq!(poller.source.calls(), 2);
        assert_eq!(sleeps(&poller).len(), 1);
    }

    #[tokio::test]
    async fn pending_goes_straight_to_answer_extraction() {
        let poller = poller(vec![status("pending")]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(outcome, PollOutcome::FetchFailed(FetchFailure::MissingAnswer));
        assert_eq!(poller.source.calls(), 1);
        assert!(sleeps(&poller).is_empty());
    }

    #[test]
    fn pending_on_first_attempt_is_terminal() {
        let view = status("pending").unwrap();
        assert_eq!(
            classify_attempt(&view, 1, 3),
            Transition::Done(PollOutcome::FetchFailed(FetchFailure::MissingAnswer))
        );
    }

    #[tokio::test]
    async fn http_error_is_not_retried() {
        let poller = poller(vec![http_error(502)]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(outcome, PollOutcome::FetchFailed(FetchFailure::HttpStatus(502)));
        assert_eq!(poller.source.calls(), 1);
        assert!(sleeps(&poller).is_empty());
    }

    #[tokio::test]
    async fn transport_error_is_not_retried() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let poller = poller(vec![status("processing"), Err(BackendApiError::Request(req_err))]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_matches!(outcome, PollOutcome::FetchFailed(FetchFailure::Transport(_)));
        assert_eq!(poller.source.calls(), 2);
    }

    #[tokio::test]
    async fn no_resolution_keeps_answer_id() {
        let poller = poller(vec![completed("nothing useful", false)]);

        let outcome = poller.poll(&JobId::new("job-1"), None).await;

        assert_eq!(
            outcome,
            PollOutcome::NoResolution {
                answer_id: AnswerId::new("ans-1")
            }
        );
    }

    #[tokio::test]
    async fn single_attempt_budget_times_out_without_sleeping() {
        let poller = JobPoller::with_sleeper(
            Scripted::new(vec![status("processing")]),
            RecordingSleeper::default(),
            PollSettings {
                max_attempts: 1,
                delay: Duration::from_secs(20),
            },
        );

        assert_eq!(poller.poll(&JobId::new("j"), None).await, PollOutcome::TimedOut);
        assert!(sleeps(&poller).is_empty());
    }

    #[test]
    fn processing_delays_never_exceed_budget_minus_one() {
        for max_attempts in 1..=5 {
            let view = status("processing").unwrap();
            let retries = (1..=max_attempts)
                .filter(|attempt| classify_attempt(&view, *attempt, max_attempts) == Transition::Retry)
                .count() as u32;
            assert_eq!(retries, max_attempts - 1);
        }
    }

    #[test]
    fn unknown_status_goes_to_answer_extraction() {
        let view = JobView {
            id: None,
            raw_status: "done".to_string(),
            answer: None,
        };
        assert_eq!(
            classify_attempt(&view, 1, 3),
            Transition::Done(PollOutcome::FetchFailed(FetchFailure::MissingAnswer))
        );
    }

    #[test]
    fn missing_resolution_flag_reads_as_no_resolution() {
        let view = JobView {
            id: None,
            raw_status: "completed".to_string(),
            answer: Some(AnswerView {
                id: Some(AnswerId::new("a")),
                content: Some("text".to_string()),
                has_resolution: None,
            }),
        };
        assert_matches!(extract_answer(&view), PollOutcome::NoResolution { .. });
    }

    #[test]
    fn resolved_answer_without_content_is_missing_answer() {
        let view = JobView {
            id: None,
            raw_status: "completed".to_string(),
            answer: Some(AnswerView {
                id: Some(AnswerId::new("a")),
                content: None,
                has_resolution: Some(true),
            }),
        };
        assert_eq!(
            extract_answer(&view),
            PollOutcome::FetchFailed(FetchFailure::MissingAnswer)
        );
    }
}

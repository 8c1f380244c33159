//! REST client for the AI escalation backend.
//!
//! Wraps the user, job and answer-vote endpoints using [`reqwest`]. Every
//! request carries the static `Authorization` token; calls made on behalf of
//! a resolved submitter also carry the `X-User-Id` actor header.

use assist_core::config::BackendConfig;
use assist_core::context::JobRequestBody;
use assist_core::feedback::VoteRequest;
use assist_core::{AnswerId, BackendUserId, JobId, JobView, Submitter};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Header naming the backend user a request is made for.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// HTTP client for one backend deployment.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
    answer_format: Option<String>,
}

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl BackendApiError {
    /// HTTP status for [`BackendApiError::ApiError`], `None` for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Request(_) => None,
        }
    }
}

/// `{"id": "..."}` returned by the create endpoints.
#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

/// Body of `POST /users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest<'a> {
    external_id: &'a str,
    name: &'a str,
    email: &'a str,
}

impl BackendApi {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            answer_format: config.answer_format.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create or identify the backend user for a chat-platform submitter.
    ///
    /// Sends `POST /users` and returns the backend-assigned id.
    pub async fn create_user(
        &self,
        submitter: &Submitter,
    ) -> Result<BackendUserId, BackendApiError> {
        let body = UserRequest {
            external_id: &submitter.external_id,
            name: &submitter.display_name,
            email: &submitter.email,
        };

        let response = self
            .request(Method::POST, "users", None)
            .json(&body)
            .send()
            .await?;

        let created: CreatedResource = Self::parse_response(response).await?;
        Ok(BackendUserId::new(created.id))
    }

    /// Create a job for an escalation context.
    ///
    /// Sends `POST /jobs` and returns the backend-assigned job id.
    pub async fn create_job(
        &self,
        body: JobRequestBody<'_>,
        actor: Option<&BackendUserId>,
    ) -> Result<JobId, BackendApiError> {
        let response = self
            .request(Method::POST, "jobs", actor)
            .json(&body)
            .send()
            .await?;

        let created: CreatedResource = Self::parse_response(response).await?;
        Ok(JobId::new(created.id))
    }

    /// Fetch the current status (and answer, once completed) of a job.
    ///
    /// Sends `GET /jobs/{job_id}`, adding `answerFormat` when configured.
    pub async fn get_job(
        &self,
        job_id: &JobId,
        actor: Option<&BackendUserId>,
    ) -> Result<JobView, BackendApiError> {
        let mut request = self.request(Method::GET, &format!("jobs/{job_id}"), actor);
        if let Some(format) = &self.answer_format {
            request = request.query(&[("answerFormat", format)]);
        }

        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Record the owner's vote on an answer.
    pub async fn post_vote(
        &self,
        answer_id: &AnswerId,
        vote: &VoteRequest,
    ) -> Result<(), BackendApiError> {
        let response = self
            .request(Method::POST, &format!("answers/{answer_id}/owner-vote"), None)
            .json(vote)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Remove the owner's vote on an answer.
    pub async fn delete_vote(&self, answer_id: &AnswerId) -> Result<(), BackendApiError> {
        let response = self
            .request(Method::DELETE, &format!("answers/{answer_id}/owner-vote"), None)
            .send()
            .await?;

        Self::check_status(response).await
    }

    // ---- private helpers ----

    /// Start a request against `{base_url}/{path}` with the shared headers.
    fn request(
        &self,
        method: Method,
        path: &str,
        actor: Option<&BackendUserId>,
    ) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}/{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, &self.auth_token);
        if let Some(actor) = actor {
            request = request.header(USER_ID_HEADER, actor.as_str());
        }
        request
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`BackendApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), BackendApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

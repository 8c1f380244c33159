//! Submitter to backend-user resolution.

use assist_core::{BackendUserId, Submitter, ValidationError};

use crate::api::{BackendApi, BackendApiError};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid submitter: {0}")]
    Validation(#[from] ValidationError),

    /// The backend could not be reached or did not return a user id.
    #[error("Could not resolve backend user: {0}")]
    Unresolved(#[source] BackendApiError),
}

/// Maps a chat-platform submitter to the backend user id jobs are
/// created on behalf of.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    api: BackendApi,
}

impl IdentityResolver {
    pub fn new(api: BackendApi) -> Self {
        Self { api }
    }

    /// Resolve `submitter` via `POST /users`.
    ///
    /// A blank external id is rejected before any request is made. Name and
    /// email are forwarded as given.
    pub async fn resolve(&self, submitter: &Submitter) -> Result<BackendUserId, IdentityError> {
        if submitter.external_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("submitterSlackUserId").into());
        }

        match self.api.create_user(submitter).await {
            Ok(user_id) => {
                tracing::info!(
                    external_id = %submitter.external_id,
                    %user_id,
                    "Resolved backend user",
                );
                Ok(user_id)
            }
            Err(e) => {
                tracing::error!(
                    external_id = %submitter.external_id,
                    error = %e,
                    "Failed to resolve backend user",
                );
                Err(IdentityError::Unresolved(e))
            }
        }
    }
}

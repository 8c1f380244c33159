use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use assist_backend::BackendApi;
use assist_core::config::BackendConfig;

pub const AUTH_TOKEN: &str = "test-token";

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub user_id: Option<String>,
    pub body: Value,
}

/// Canned responses plus a log of every request received.
#[derive(Default)]
pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    pub user_response: Mutex<Option<(u16, Value)>>,
    pub job_response: Mutex<Option<(u16, Value)>>,
    pub job_statuses: Mutex<VecDeque<(u16, Value)>>,
    pub vote_status: Mutex<Option<u16>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, method: Method, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn set_user(&self, status: u16, body: Value) {
        *self.user_response.lock().unwrap() = Some((status, body));
    }

    pub fn set_job(&self, status: u16, body: Value) {
        *self.job_response.lock().unwrap() = Some((status, body));
    }

    pub fn push_status(&self, status: u16, body: Value) {
        self.job_statuses.lock().unwrap().push_back((status, body));
    }

    pub fn set_vote_status(&self, status: u16) {
        *self.vote_status.lock().unwrap() = Some(status);
    }
}

fn reply(status: u16, body: Value) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(body)).into_response()
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        user_id: header("x-user-id"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match (method, path.as_str()) {
        (Method::POST, "/users") => {
            let (status, body) = state
                .user_response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or((200, json!({ "id": "user-1" })));
            reply(status, body)
        }
        (Method::POST, "/jobs") => {
            let (status, body) = state
                .job_response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or((200, json!({ "id": "job-1" })));
            reply(status, body)
        }
        (Method::GET, p) if p.starts_with("/jobs/") => {
            let next = state.job_statuses.lock().unwrap().pop_front();
            let (status, body) = next.unwrap_or((200, json!({ "status": "processing" })));
            reply(status, body)
        }
        (Method::POST | Method::DELETE, p) if p.ends_with("/owner-vote") => {
            let status = state.vote_status.lock().unwrap().unwrap_or(200);
            reply(status, json!({}))
        }
        _ => reply(404, json!({ "error": "not found" })),
    }
}

/// Start a mock backend on an ephemeral port.
///
/// Returns its base URL and the shared state for scripting and assertions.
pub async fn spawn_backend() -> (String, Arc<MockState>) {
    let state = Arc::new(MockState::default());
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

pub fn backend_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        auth_token: AUTH_TOKEN.to_string(),
        answer_format: Some("slack".to_string()),
        request_timeout: Duration::from_secs(5),
    }
}

pub fn api(base_url: &str) -> BackendApi {
    BackendApi::new(&backend_config(base_url)).unwrap()
}

//! Stateful mock course backend for integration testing.
//!
//! Serves the same routes as the real backend under `/api`:
//! - `GET /api/courses`, `POST /api/courses` (answers `201 {"id": ..}`)
//! - `GET /api/health`
//!
//! plus a few failure endpoints (`/api/broken`, `/api/garbage`). Optionally
//! requires a bearer token and delays the course list for timeout testing.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use study_coach::common::config::{ApiConfig, BaseUrlPolicy};

/// Mock backend configuration.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    courses: Vec<Value>,
    required_token: Option<String>,
    list_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Recorded {
    courses: Vec<Value>,
    next_id: i64,
    /// `Authorization` header of every request, in arrival order
    auth_headers: Vec<Option<String>>,
    request_count: u32,
}

#[derive(Debug)]
struct MockState {
    required_token: Option<String>,
    list_delay: Option<Duration>,
    recorded: Mutex<Recorded>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the course store.
    pub fn with_courses(mut self, courses: Vec<Value>) -> Self {
        self.courses = courses;
        self
    }

    /// Answer 401 unless `Authorization: Bearer <token>` is sent.
    pub fn require_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Delay `GET /api/courses`.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub async fn start(self) -> (SocketAddr, MockServerHandle) {
        let next_id = self
            .courses
            .iter()
            .filter_map(|c| c["id"].as_i64())
            .max()
            .unwrap_or(0)
            + 1;

        let state = Arc::new(MockState {
            required_token: self.required_token,
            list_delay: self.list_delay,
            recorded: Mutex::new(Recorded {
                courses: self.courses,
                next_id,
                ..Default::default()
            }),
        });

        let app = Router::new()
            .route("/api/courses", get(list_courses).post(create_course))
            .route("/api/health", get(health))
            .route("/api/broken", get(broken))
            .route("/api/garbage", get(garbage))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (
            addr,
            MockServerHandle {
                state,
                _handle: handle,
            },
        )
    }
}

/// Handle to the running mock backend.
pub struct MockServerHandle {
    state: Arc<MockState>,
    _handle: JoinHandle<()>,
}

impl MockServerHandle {
    pub fn request_count(&self) -> u32 {
        self.state.recorded.lock().unwrap().request_count
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.recorded.lock().unwrap().auth_headers.clone()
    }

    pub fn stored_courses(&self) -> Vec<Value> {
        self.state.recorded.lock().unwrap().courses.clone()
    }
}

/// Gateway configuration pointing at a mock backend.
pub fn api_config(addr: SocketAddr) -> ApiConfig {
    ApiConfig::resolve(Some(&format!("http://{}", addr)), BaseUrlPolicy::Permissive).unwrap()
}

/// An address nothing is listening on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Record the request; `Err` carries the 401 to send back.
fn admit(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut recorded = state.recorded.lock().unwrap();
    recorded.request_count += 1;
    recorded.auth_headers.push(auth.clone());

    match &state.required_token {
        Some(token) if auth.as_deref() != Some(format!("Bearer {}", token).as_str()) => {
            Err((StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response())
        }
        _ => Ok(()),
    }
}

async fn list_courses(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = admit(&state, &headers) {
        return rejection;
    }

    if let Some(delay) = state.list_delay {
        tokio::time::sleep(delay).await;
    }

    let courses = state.recorded.lock().unwrap().courses.clone();
    Json(Value::Array(courses)).into_response()
}

async fn create_course(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = admit(&state, &headers) {
        return rejection;
    }

    let mut recorded = state.recorded.lock().unwrap();
    let id = recorded.next_id;
    recorded.next_id += 1;

    recorded.courses.push(json!({
        "id": id,
        "name": body["name"],
        "termStart": body["termStart"],
        "termEnd": body["termEnd"],
        "mainExamDate": body["mainExamDate"],
    }));

    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn health(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = admit(&state, &headers) {
        return rejection;
    }
    Json(json!({"status": "ok"})).into_response()
}

async fn broken(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = admit(&state, &headers) {
        return rejection;
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn garbage(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = admit(&state, &headers) {
        return rejection;
    }
    (StatusCode::OK, "<html>not json</html>").into_response()
}

//! Shared test fixtures: a scriptable mock of the upstream OCR provider.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// A 1x1 transparent PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Scripted behavior of the mock provider.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Token handed out by the login endpoint; `None` scripts a rejected
    /// login (body without a token field).
    pub login_token: Option<String>,
    /// Engine granted by the permission check; `None` scripts quota
    /// exhaustion.
    pub engine: Option<String>,
    /// Job id handed out on submission; `None` scripts a rejected job.
    pub job_id: Option<String>,
    /// Text fragments in the completed result.
    pub fragments: Vec<String>,
    /// Number of status calls answered "still running" before the job ends.
    pub polls_before_end: usize,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            login_token: Some("mock-session-token".to_string()),
            engine: Some("ocr1".to_string()),
            job_id: Some("job-1".to_string()),
            fragments: vec![],
            polls_before_end: 0,
        }
    }
}

/// Mock upstream provider with call counters for assertions.
#[derive(Debug, Default)]
pub struct MockUpstream {
    pub behavior: Mutex<MockBehavior>,
    pub login_calls: AtomicUsize,
    pub anonymous_calls: AtomicUsize,
    pub permission_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl MockUpstream {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            ..Self::default()
        })
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

async fn login(State(mock): State<Arc<MockUpstream>>) -> Json<Value> {
    mock.login_calls.fetch_add(1, Ordering::SeqCst);
    let behavior = mock.behavior.lock().unwrap().clone();
    match behavior.login_token {
        Some(token) => Json(json!({ "data": { "token": token } })),
        None => Json(json!({ "data": { "msg": "invalid credentials" } })),
    }
}

async fn anonymous(State(mock): State<Arc<MockUpstream>>) -> Json<Value> {
    mock.anonymous_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": {} }))
}

async fn permission(State(mock): State<Arc<MockUpstream>>) -> Json<Value> {
    mock.permission_calls.fetch_add(1, Ordering::SeqCst);
    let behavior = mock.behavior.lock().unwrap().clone();
    match behavior.engine {
        Some(engine) => Json(json!({ "data": { "engine": engine, "token": "perm-token" } })),
        None => Json(json!({ "data": {} })),
    }
}

async fn submit(
    State(mock): State<Arc<MockUpstream>>,
    Path(_engine): Path<String>,
) -> Json<Value> {
    mock.submit_calls.fetch_add(1, Ordering::SeqCst);
    let behavior = mock.behavior.lock().unwrap().clone();
    match behavior.job_id {
        Some(id) => Json(json!({ "data": { "jobStatusId": id } })),
        None => Json(json!({ "data": {} })),
    }
}

async fn status(
    State(mock): State<Arc<MockUpstream>>,
    Path(_engine): Path<String>,
) -> Json<Value> {
    let call = mock.status_calls.fetch_add(1, Ordering::SeqCst);
    let behavior = mock.behavior.lock().unwrap().clone();

    if call < behavior.polls_before_end {
        return Json(json!({ "data": { "isEnded": false } }));
    }

    let words: Vec<Value> = behavior
        .fragments
        .iter()
        .map(|w| json!({ "words": w }))
        .collect();
    Json(json!({
        "data": {
            "isEnded": true,
            "ydResp": { "words_result": words }
        }
    }))
}

async fn image() -> ([(axum::http::HeaderName, &'static str); 1], &'static [u8]) {
    ([(axum::http::header::CONTENT_TYPE, "image/png")], TINY_PNG)
}

/// Bind the mock provider on an ephemeral port and return its base URL.
pub async fn spawn_mock(mock: Arc<MockUpstream>) -> String {
    let router = Router::new()
        .route("/api/user/login", post(login))
        .route("/api/user/login/anonymous", post(anonymous))
        .route("/api/perm/single", post(permission))
        .route("/api/ocr/image/{engine}", post(submit))
        .route("/api/ocr/image/{engine}/status", get(status))
        .route("/image.png", get(image))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

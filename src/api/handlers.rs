//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::payload;
use super::types::{ErrorResponse, HealthResponse, RecognizeRequest};
use crate::config::Config;
use crate::error::{OcrRelayError, Result};
use crate::store::{keys, CredentialStore};
use crate::upstream::{Credentials, Session, UpstreamClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<CredentialStore>,
    /// Client for inbound-side fetches (remote image URLs).
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: CredentialStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            http: reqwest::Client::new(),
        }
    }

    /// Resolve the inbound API key: config (and thus environment) first,
    /// then the credential store.
    pub fn api_key(&self) -> Result<Option<String>> {
        if let Some(key) = self.config.auth.api_key.as_deref() {
            let key = key.trim();
            if !key.is_empty() {
                return Ok(Some(key.to_string()));
            }
        }
        self.store.get(keys::API_KEY)
    }

    /// Resolve upstream credentials: config overrides first, then the
    /// credential store. Both parts are required.
    pub fn credentials(&self) -> Result<Credentials> {
        let username = match self.config.upstream.username.clone() {
            Some(u) if !u.is_empty() => Some(u),
            _ => self.store.get(keys::USERNAME)?,
        };
        let password = match self.config.upstream.password.clone() {
            Some(p) if !p.is_empty() => Some(p),
            _ => self.store.get(keys::PASSWORD)?,
        };

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials::new(username, password)),
            _ => Err(OcrRelayError::Configuration(
                "username or password not configured".to_string(),
            )),
        }
    }
}

/// Health check endpoint.
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        port: state.config.server.port,
    })
}

/// Recognize an image: extract the payload, run it through upstream,
/// return the extracted text as plain text.
pub async fn recognize(
    State(state): State<AppState>,
    request: Request,
) -> std::result::Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let image_base64 = extract_image(&state, request)
        .await
        .map_err(error_response)?;

    let credentials = state.credentials().map_err(error_response)?;
    let device_id = state.store.get(keys::DEVICE_ID).map_err(error_response)?;
    let session_token = state
        .store
        .get(keys::SESSION_TOKEN)
        .map_err(error_response)?;

    let mut client = UpstreamClient::new(&state.config.upstream, credentials)
        .map_err(error_response)?
        .with_session(device_id, session_token);

    // Persist immediately after login so a crash mid-recognition still
    // keeps the rotated token for the next run.
    let session = client.ensure_authorized().await.map_err(error_response)?;
    persist_session(&state.store, &session).map_err(error_response)?;

    let text = client.recognize(&image_base64).await.map_err(error_response)?;
    if let Some(session) = client.session() {
        persist_session(&state.store, &session).map_err(error_response)?;
    }

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}

/// Pull the image payload out of the request, branching on content type.
async fn extract_image(state: &AppState, request: Request) -> Result<String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| OcrRelayError::Input(format!("malformed multipart body: {e}")))?;
        payload::from_multipart(multipart, &state.http).await
    } else {
        let Json(body) = Json::<RecognizeRequest>::from_request(request, state)
            .await
            .map_err(|e| OcrRelayError::Input(format!("malformed request body: {e}")))?;
        payload::from_json(body, &state.http).await
    }
}

fn persist_session(store: &CredentialStore, session: &Session) -> Result<()> {
    store.set_many([
        (keys::DEVICE_ID, session.device_id.as_str()),
        (keys::SESSION_TOKEN, session.session_token.as_str()),
    ])
}

/// Map a core error to the HTTP boundary: configuration failures are the
/// server's fault (500), everything else surfaces as a failed relay (502).
fn error_response(err: OcrRelayError) -> (StatusCode, Json<ErrorResponse>) {
    error!("recognition failed: {err}");

    let status = match err {
        OcrRelayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };

    let code = match err {
        OcrRelayError::Configuration(_) => "NOT_CONFIGURED",
        OcrRelayError::Authentication(_) => "AUTH_FAILED",
        OcrRelayError::QuotaExceeded => "QUOTA_EXCEEDED",
        OcrRelayError::Submission(_) => "SUBMISSION_FAILED",
        OcrRelayError::Input(_) => "BAD_IMAGE",
        OcrRelayError::PollTimeout(_) => "POLL_TIMEOUT",
        OcrRelayError::Upstream(_) | OcrRelayError::Malformed(_) | OcrRelayError::Io(_) => {
            "UPSTREAM_ERROR"
        }
    };

    (status, Json(ErrorResponse::new(code, err.to_string())))
}

//! HTTP client for the upstream OCR provider.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use sha1::{Digest, Sha1};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::session::{generate_device_id, AccountType, Credentials, Session};
use super::types::{
    EngineResult, LoginRequest, LoginResponse, PermissionGrant, PermissionRequest,
    PermissionResponse, StatusResponse, SubmissionRequest, SubmissionResponse,
};
use crate::config::UpstreamSection;
use crate::error::{OcrRelayError, Result};

/// Device identifier header, client-chosen and stable across logins.
const HEADER_DEVICE: &str = "X-AUTH-UUID";
/// Session token header, rotates on each login.
const HEADER_TOKEN: &str = "X-AUTH-TOKEN";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Client for the upstream provider, holding the session identity.
///
/// The session is either fully unset (not logged in) or fully set; `login`
/// is the only mutation and always pairs a token with a device id,
/// generating the device id first when none is held.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    device_id: Option<String>,
    session_token: Option<String>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl UpstreamClient {
    /// Build a client against the configured upstream.
    pub fn new(upstream: &UpstreamSection, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(upstream.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            credentials,
            device_id: None,
            session_token: None,
            poll_interval: upstream.poll_interval(),
            poll_timeout: upstream.poll_timeout(),
        })
    }

    /// Seed the client with a previously persisted session identity.
    pub fn with_session(
        mut self,
        device_id: Option<String>,
        session_token: Option<String>,
    ) -> Self {
        self.device_id = device_id.filter(|v| !v.is_empty());
        self.session_token = session_token.filter(|v| !v.is_empty());
        self
    }

    /// Device identifier currently held, if any.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Session token currently held, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// The ready session, when both identity parts are held.
    pub fn session(&self) -> Option<Session> {
        Session::from_parts(self.device_id.as_deref(), self.session_token.as_deref())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in to upstream, rotating the session token.
    ///
    /// The response is classified purely by the presence of a token field:
    /// a token-less body is an authentication failure regardless of HTTP
    /// status, and the raw body is carried for diagnostics.
    pub async fn login(&mut self) -> Result<Session> {
        let device_id = match self.device_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = generate_device_id();
                self.device_id = Some(id.clone());
                id
            }
        };

        let account_type = AccountType::classify(&self.credentials.username);
        debug!(account_type = account_type.as_str(), "logging in to upstream");

        let body = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
            account_type: account_type.as_str(),
        };

        let response = self
            .http
            .post(self.endpoint("/api/user/login"))
            .header(HEADER_DEVICE, &device_id)
            .header(HEADER_TOKEN, "")
            .json(&body)
            .send()
            .await?;

        let raw = response.text().await?;
        let parsed: LoginResponse = serde_json::from_str(&raw).unwrap_or_default();
        let token = parsed
            .data
            .and_then(|d| d.token)
            .filter(|t| !t.is_empty())
            .ok_or(OcrRelayError::Authentication(raw))?;

        info!("upstream login succeeded");
        self.session_token = Some(token.clone());

        Ok(Session {
            device_id,
            session_token: token,
        })
    }

    /// Return the held session, logging in only when it is unset.
    ///
    /// Cheap idempotent guard: issues no network call when both identity
    /// parts are present, and does not detect expired-but-present tokens.
    pub async fn ensure_authorized(&mut self) -> Result<Session> {
        if let Some(session) = self.session() {
            return Ok(session);
        }
        self.login().await
    }

    /// Run one image through the upstream pipeline and return plain text.
    ///
    /// `image_base64` is the bare base64 payload; fragments of the result
    /// are joined with newlines, and zero fragments yield an empty string.
    pub async fn recognize(&mut self, image_base64: &str) -> Result<String> {
        let session = self.ensure_authorized().await?;

        // Upstream's server-side session bookkeeping requires this call
        // before permission checks succeed; the response is ignored.
        self.http
            .post(self.endpoint("/api/user/login/anonymous"))
            .header(HEADER_DEVICE, &session.device_id)
            .header(HEADER_TOKEN, &session.session_token)
            .send()
            .await?;

        let grant = self.check_permission(&session).await?;
        let engine = grant
            .engine
            .filter(|e| !e.is_empty())
            .ok_or(OcrRelayError::QuotaExceeded)?;

        let data_url = format!("data:image/png;base64,{image_base64}");
        let hash = fingerprint(&data_url);

        let job_id = self
            .submit_job(&session, &engine, grant.token.as_deref(), &data_url, &hash)
            .await?;
        debug!(%engine, %job_id, "recognition job submitted");

        self.poll_job(&session, &engine, &job_id).await
    }

    /// Request single-image quota. An absent engine field signals quota
    /// exhaustion at the call site, never a generic error.
    async fn check_permission(&self, session: &Session) -> Result<PermissionGrant> {
        let response = self
            .http
            .post(self.endpoint("/api/perm/single"))
            .header(HEADER_DEVICE, &session.device_id)
            .header(HEADER_TOKEN, &session.session_token)
            .json(&PermissionRequest { mode: "single" })
            .send()
            .await?;

        let raw = response.text().await?;
        let parsed: PermissionResponse = serde_json::from_str(&raw).unwrap_or_default();
        Ok(parsed.data.unwrap_or_default())
    }

    async fn submit_job(
        &self,
        session: &Session,
        engine: &str,
        permission_token: Option<&str>,
        data_url: &str,
        hash: &str,
    ) -> Result<String> {
        let body = SubmissionRequest {
            batch_id: "",
            total: 1,
            token: permission_token,
            hash,
            name: "upload.png",
            size: 0,
            data_url,
            result: serde_json::json!({}),
            status: "processing",
            is_success: false,
        };

        let response = self
            .http
            .post(self.endpoint(&format!("/api/ocr/image/{engine}")))
            .header(HEADER_DEVICE, &session.device_id)
            .header(HEADER_TOKEN, &session.session_token)
            .json(&body)
            .send()
            .await?;

        let raw = response.text().await?;
        let parsed: SubmissionResponse = serde_json::from_str(&raw).unwrap_or_default();
        parsed
            .data
            .and_then(|d| d.job_status_id)
            .filter(|id| !id.is_empty())
            .ok_or(OcrRelayError::Submission(raw))
    }

    /// Poll the job until it ends or the deadline expires.
    ///
    /// Fixed interval, no backoff; retries only on "not yet done". A
    /// transport error aborts the call, and deadline expiry maps to
    /// `PollTimeout` rather than waiting forever.
    async fn poll_job(&self, session: &Session, engine: &str, job_id: &str) -> Result<String> {
        let deadline = Instant::now() + self.poll_timeout;

        loop {
            sleep(self.poll_interval).await;
            if Instant::now() >= deadline {
                return Err(OcrRelayError::PollTimeout(self.poll_timeout));
            }

            let response = self
                .http
                .get(self.endpoint(&format!("/api/ocr/image/{engine}/status")))
                .query(&[("jobStatusId", job_id)])
                .header(HEADER_DEVICE, &session.device_id)
                .header(HEADER_TOKEN, &session.session_token)
                .send()
                .await?;

            let raw = response.text().await?;
            let parsed: StatusResponse = serde_json::from_str(&raw).unwrap_or_default();
            let Some(status) = parsed.data else { continue };
            if !status.is_ended {
                continue;
            }

            return Ok(join_fragments(status.engine_result));
        }
    }
}

/// SHA-1 hex fingerprint of the data-URL-encoded image.
///
/// Deterministic for identical input; used only as an upstream
/// deduplication and tracing hint, never for integrity checks.
pub fn fingerprint(data_url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data_url.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn join_fragments(result: Option<EngineResult>) -> String {
    result
        .map(|r| r.words_result)
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.words)
        .collect::<Vec<_>>()
        .join("\n")
}

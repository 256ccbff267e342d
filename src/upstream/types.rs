//! Typed request and response shapes for the upstream endpoints.
//!
//! Field names follow the upstream wire contract and are treated as opaque;
//! every response sits under a `data` envelope. All response structs default
//! to "absent" so that bodies which fail to parse degrade to missing-field
//! handling rather than a separate error path.

use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    /// Account-type tag: "mobile" or "email".
    #[serde(rename = "type")]
    pub account_type: &'a str,
}

/// Login response: `data.token` is the rotating session token.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub data: Option<LoginData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
}

/// Permission request body for single-image quota.
#[derive(Debug, Serialize)]
pub struct PermissionRequest<'a> {
    pub mode: &'a str,
}

/// Permission response: an absent `engine` means the quota is exhausted.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionResponse {
    #[serde(default)]
    pub data: Option<PermissionGrant>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionGrant {
    /// Upstream-selected recognition engine identifier.
    #[serde(default)]
    pub engine: Option<String>,
    /// One-shot permission token to attach to the submission.
    #[serde(default)]
    pub token: Option<String>,
}

/// Job submission body for the engine-specific submission endpoint.
#[derive(Debug, Serialize)]
pub struct SubmissionRequest<'a> {
    #[serde(rename = "batchId")]
    pub batch_id: &'a str,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    /// SHA-1 hex fingerprint of the data URL, a dedup/tracing hint.
    pub hash: &'a str,
    pub name: &'a str,
    pub size: u64,
    #[serde(rename = "dataUrl")]
    pub data_url: &'a str,
    pub result: serde_json::Value,
    pub status: &'a str,
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
}

/// Submission response: `data.jobStatusId` identifies the async job.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub data: Option<SubmissionReceipt>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(rename = "jobStatusId", default)]
    pub job_status_id: Option<String>,
}

/// Job status response, polled until `data.isEnded`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub data: Option<JobStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "isEnded", default)]
    pub is_ended: bool,
    /// Engine result payload; absent while the job runs and for empty results.
    #[serde(rename = "ydResp", default)]
    pub engine_result: Option<EngineResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineResult {
    #[serde(rename = "words_result", default)]
    pub words_result: Vec<TextFragment>,
}

/// One recognized text fragment.
#[derive(Debug, Default, Deserialize)]
pub struct TextFragment {
    #[serde(default)]
    pub words: String,
}

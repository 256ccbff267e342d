//! Inbound image payload extraction.
//!
//! A recognition request may carry its image three ways: a multipart file
//! upload, a base64 field (optionally wrapped in a data URL), or a remote
//! URL to fetch. All paths normalize to a bare base64 string.

use std::time::Duration;

use axum::extract::Multipart;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::types::RecognizeRequest;
use crate::error::{OcrRelayError, Result};

const URL_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Strip an optional `data:image/...;base64,` marker and validate that a
/// payload remains.
pub fn normalize_base64(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OcrRelayError::Input("image_base64 is empty".to_string()));
    }

    let marker = "base64,";
    let payload = match trimmed.find(marker) {
        Some(pos) => &trimmed[pos + marker.len()..],
        None => trimmed,
    };

    if payload.is_empty() {
        return Err(OcrRelayError::Input(
            "image_base64 payload is empty".to_string(),
        ));
    }

    Ok(payload.to_string())
}

/// Download a remote image and return it base64-encoded.
pub async fn fetch_image_as_base64(http: &reqwest::Client, url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(OcrRelayError::Input("image_url is required".to_string()));
    }

    let response = http
        .get(url.trim())
        .timeout(URL_FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| OcrRelayError::Input(format!("failed to download image: {e}")))?;

    if !response.status().is_success() {
        return Err(OcrRelayError::Input(format!(
            "failed to download image: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| OcrRelayError::Input(format!("failed to download image: {e}")))?;

    if bytes.is_empty() {
        return Err(OcrRelayError::Input("downloaded image is empty".to_string()));
    }

    Ok(BASE64.encode(&bytes))
}

/// Extract the image from a multipart form: a `file` part, or
/// `image_base64` / `image_url` fields.
pub async fn from_multipart(
    mut multipart: Multipart,
    http: &reqwest::Client,
) -> Result<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrRelayError::Input(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| OcrRelayError::Input(format!("unreadable file part: {e}")))?;
                if bytes.is_empty() {
                    return Err(OcrRelayError::Input("uploaded file is empty".to_string()));
                }
                return Ok(BASE64.encode(&bytes));
            }
            Some("image_base64") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| OcrRelayError::Input(format!("unreadable field: {e}")))?;
                return normalize_base64(&text);
            }
            Some("image_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| OcrRelayError::Input(format!("unreadable field: {e}")))?;
                return fetch_image_as_base64(http, &text).await;
            }
            _ => continue,
        }
    }

    Err(OcrRelayError::Input(
        "multipart form requires file, image_base64 or image_url".to_string(),
    ))
}

/// Extract the image from a JSON body.
pub async fn from_json(body: RecognizeRequest, http: &reqwest::Client) -> Result<String> {
    if let Some(raw) = body.image_base64 {
        return normalize_base64(&raw);
    }
    if let Some(url) = body.image_url {
        return fetch_image_as_base64(http, &url).await;
    }
    Err(OcrRelayError::Input(
        "request must include image_base64 or image_url".to_string(),
    ))
}

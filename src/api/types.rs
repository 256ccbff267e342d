//! API request and response types.

use serde::{Deserialize, Serialize};

/// JSON body accepted by the recognition endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RecognizeRequest {
    /// Base64 image payload, optionally with a `data:image/...;base64,`
    /// prefix.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// Remote image URL to fetch and recognize.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub port: u16,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "QUOTA_EXCEEDED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new("NOT_CONFIGURED", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_request_empty_body() {
        let req: RecognizeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image_base64.is_none());
        assert!(req.image_url.is_none());
    }

    #[test]
    fn test_recognize_request_with_fields() {
        let json = r#"{"image_base64": "AAAA", "image_url": "http://example.com/a.png"}"#;
        let req: RecognizeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.image_base64.as_deref(), Some("AAAA"));
        assert_eq!(req.image_url.as_deref(), Some("http://example.com/a.png"));
    }

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("TEST_ERROR"));
        assert!(json.contains("Test message"));
    }

    #[test]
    fn test_health_response_serialization() {
        let health = HealthResponse {
            status: "ok",
            port: 8000,
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"ok\""));
        assert!(json.contains("8000"));
    }
}

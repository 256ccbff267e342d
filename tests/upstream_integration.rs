//! Upstream client integration tests against the mock provider.

mod common;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use common::{spawn_mock, MockBehavior, MockUpstream, TINY_PNG};
use ocr_relay::config::UpstreamSection;
use ocr_relay::{Credentials, OcrRelayError, UpstreamClient};

fn upstream_section(base_url: &str) -> UpstreamSection {
    UpstreamSection {
        base_url: base_url.to_string(),
        poll_interval_ms: 10,
        poll_timeout_secs: 2,
        ..UpstreamSection::default()
    }
}

fn test_credentials() -> Credentials {
    Credentials::new("user@example.com", "secret")
}

fn tiny_png_base64() -> String {
    BASE64.encode(TINY_PNG)
}

// ============================================================================
// Login / Session Tests
// ============================================================================

#[tokio::test]
async fn test_login_issues_session() {
    let mock = MockUpstream::new(MockBehavior::default());
    let base_url = spawn_mock(mock.clone()).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let session = client.login().await.unwrap();

    assert!(!session.device_id.is_empty());
    assert_eq!(session.session_token, "mock-session-token");
    assert_eq!(mock.login_calls(), 1);
}

#[tokio::test]
async fn test_login_keeps_seeded_device_id() {
    let mock = MockUpstream::new(MockBehavior::default());
    let base_url = spawn_mock(mock.clone()).await;

    let mut client = UpstreamClient::new(&upstream_section(&base_url), test_credentials())
        .unwrap()
        .with_session(Some("stable-device".to_string()), None);

    let session = client.login().await.unwrap();
    assert_eq!(session.device_id, "stable-device");
}

#[tokio::test]
async fn test_login_without_token_is_auth_error() {
    let mock = MockUpstream::new(MockBehavior {
        login_token: None,
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let err = client.login().await.unwrap_err();

    match err {
        OcrRelayError::Authentication(body) => {
            // Raw body is carried for diagnostics
            assert!(body.contains("invalid credentials"));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ensure_authorized_logs_in_at_most_once() {
    let mock = MockUpstream::new(MockBehavior::default());
    let base_url = spawn_mock(mock.clone()).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();

    let first = client.ensure_authorized().await.unwrap();
    let second = client.ensure_authorized().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.login_calls(), 1);
}

// ============================================================================
// Recognition Tests
// ============================================================================

#[tokio::test]
async fn test_recognize_returns_single_fragment() {
    let mock = MockUpstream::new(MockBehavior {
        fragments: vec!["你好".to_string()],
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock.clone()).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let text = client.recognize(&tiny_png_base64()).await.unwrap();

    assert_eq!(text, "你好");
    assert_eq!(mock.anonymous_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(mock.submit_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recognize_joins_fragments_with_newlines() {
    let mock = MockUpstream::new(MockBehavior {
        fragments: vec!["AB".to_string(), "CD".to_string()],
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let text = client.recognize(&tiny_png_base64()).await.unwrap();

    assert_eq!(text, "AB\nCD");
}

#[tokio::test]
async fn test_recognize_empty_result_is_empty_string() {
    let mock = MockUpstream::new(MockBehavior::default());
    let base_url = spawn_mock(mock).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let text = client.recognize(&tiny_png_base64()).await.unwrap();

    assert_eq!(text, "");
}

#[tokio::test]
async fn test_recognize_waits_for_job_to_end() {
    let mock = MockUpstream::new(MockBehavior {
        fragments: vec!["slow".to_string()],
        polls_before_end: 3,
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock.clone()).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let text = client.recognize(&tiny_png_base64()).await.unwrap();

    assert_eq!(text, "slow");
    assert!(mock.status_calls.load(std::sync::atomic::Ordering::SeqCst) >= 4);
}

#[tokio::test]
async fn test_recognize_reuses_seeded_session() {
    let mock = MockUpstream::new(MockBehavior::default());
    let base_url = spawn_mock(mock.clone()).await;

    let mut client = UpstreamClient::new(&upstream_section(&base_url), test_credentials())
        .unwrap()
        .with_session(
            Some("dev-1".to_string()),
            Some("persisted-token".to_string()),
        );

    client.recognize(&tiny_png_base64()).await.unwrap();
    assert_eq!(mock.login_calls(), 0);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_engine_is_quota_error() {
    let mock = MockUpstream::new(MockBehavior {
        engine: None,
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let err = client.recognize(&tiny_png_base64()).await.unwrap_err();

    assert!(matches!(err, OcrRelayError::QuotaExceeded));
}

#[tokio::test]
async fn test_missing_job_id_is_submission_error() {
    let mock = MockUpstream::new(MockBehavior {
        job_id: None,
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock).await;

    let mut client =
        UpstreamClient::new(&upstream_section(&base_url), test_credentials()).unwrap();
    let err = client.recognize(&tiny_png_base64()).await.unwrap_err();

    assert!(matches!(err, OcrRelayError::Submission(_)));
}

#[tokio::test]
async fn test_poll_deadline_expires() {
    let mock = MockUpstream::new(MockBehavior {
        fragments: vec!["never".to_string()],
        polls_before_end: usize::MAX,
        ..MockBehavior::default()
    });
    let base_url = spawn_mock(mock).await;

    let section = UpstreamSection {
        poll_timeout_secs: 1,
        ..upstream_section(&base_url)
    };
    let mut client = UpstreamClient::new(&section, test_credentials()).unwrap();
    let err = client.recognize(&tiny_png_base64()).await.unwrap_err();

    assert!(matches!(err, OcrRelayError::PollTimeout(_)));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let section = upstream_section("http://127.0.0.1:1");
    let mut client = UpstreamClient::new(&section, test_credentials()).unwrap();

    let err = client.login().await.unwrap_err();
    assert!(matches!(err, OcrRelayError::Upstream(_)));
}

//! Static API key authentication for the recognition endpoint.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};

use super::handlers::AppState;
use super::types::ErrorResponse;

/// Bearer token guard.
///
/// The expected key is resolved per request (environment and config take
/// precedence over the credential store). A missing key is a server
/// misconfiguration, not a caller error.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let expected = state
        .api_key()
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::not_configured(e.to_string())),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::not_configured("API key is not configured")),
            )
        })?;

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized("missing Authorization header")),
            )
        })?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() || token != expected {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthorized("invalid Authorization token")),
        ));
    }

    Ok(next.run(request).await)
}

//! API router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_bearer;
use super::handlers::{healthz, recognize, AppState};

/// Images arrive base64- or multipart-encoded; allow some headroom.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the API router with all routes configured.
pub fn create_router_with_state(state: AppState) -> Router {
    // Recognition requires the bearer key; the health probe does not.
    let guarded = Router::new()
        .route("/ocr", post(recognize))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(guarded)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: AppState) -> crate::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting ocr-relay API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::OcrRelayError::Io)?;

    axum::serve(listener, router)
        .await
        .map_err(|e| crate::error::OcrRelayError::Io(std::io::Error::other(e.to_string())))?;

    Ok(())
}

//! API layer for ocr-relay.
//!
//! ## Endpoints
//!
//! - `POST /ocr` - Recognize an image (bearer key required). Accepts a
//!   multipart `file` upload, or `image_base64` / `image_url` fields as
//!   multipart or JSON. Responds with the recognized text as plain text.
//! - `GET /healthz` - Health check (no authentication).

pub mod auth;
pub mod handlers;
pub mod payload;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{create_router_with_state, serve};
pub use types::{ErrorResponse, HealthResponse, RecognizeRequest};

//! # ocr-relay
//!
//! Lightweight HTTP relay in front of an asynchronous OCR web service.
//!
//! The relay accepts an image over a bearer-guarded HTTP endpoint, keeps an
//! authenticated session with the upstream OCR provider (logging in on
//! demand, persisting the rotating token to a small key-value file), submits
//! the image as an asynchronous recognition job, polls it to completion
//! under a deadline, and returns the extracted text as plain text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ocr_relay::{api, AppState, Config, CredentialStore};
//!
//! #[tokio::main]
//! async fn main() -> ocr_relay::Result<()> {
//!     ocr_relay::logging::try_init().ok();
//!
//!     let config = Config::default();
//!     let store = CredentialStore::new(&config.server.store_path);
//!     let state = AppState::new(config, store);
//!
//!     api::serve(state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod upstream;

// Re-export commonly used types
pub use api::{create_router_with_state, AppState};
pub use config::Config;
pub use error::{OcrRelayError, Result};
pub use store::CredentialStore;
pub use upstream::{AccountType, Credentials, Session, UpstreamClient};

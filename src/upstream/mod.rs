//! Upstream OCR provider integration.
//!
//! This module owns the authenticated-session lifecycle and the
//! submit/poll protocol against the upstream provider. The session is a
//! (device id, session token) pair: the device id is client-generated and
//! stable across logins, the token is issued by upstream and rotates on
//! every login. Recognition runs an image through the provider's
//! asynchronous pipeline: permission check, job submission, bounded status
//! polling, text extraction.

pub mod client;
pub mod session;
pub mod types;

pub use client::UpstreamClient;
pub use session::{AccountType, Credentials, Session};

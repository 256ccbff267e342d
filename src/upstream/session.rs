//! Session identity and account classification.

use uuid::Uuid;

/// Upstream account credentials, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A ready upstream session: both fields are always non-empty.
///
/// Partial states ("device id but no token") live only inside the client as
/// options; a `Session` value is handed out exclusively by a successful
/// login or by the idempotent authorization guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque client-generated device identifier, stable across logins.
    pub device_id: String,
    /// Bearer token issued by upstream, rotates on each login.
    pub session_token: String,
}

impl Session {
    /// Build a session from its parts; returns `None` unless both are
    /// non-empty.
    pub fn from_parts(device_id: Option<&str>, session_token: Option<&str>) -> Option<Self> {
        match (device_id, session_token) {
            (Some(id), Some(token)) if !id.is_empty() && !token.is_empty() => Some(Self {
                device_id: id.to_string(),
                session_token: token.to_string(),
            }),
            _ => None,
        }
    }
}

/// Generate a fresh device identifier.
pub fn generate_device_id() -> String {
    Uuid::new_v4().to_string()
}

/// Upstream account type, derived from the username shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// All-digit usernames are phone numbers.
    Mobile,
    /// Everything else is treated as an email account.
    Email,
}

impl AccountType {
    /// Classify a username. Matches `^[0-9]+$` for the mobile case.
    pub fn classify(username: &str) -> Self {
        if !username.is_empty() && username.bytes().all(|b| b.is_ascii_digit()) {
            Self::Mobile
        } else {
            Self::Email
        }
    }

    /// Tag string the upstream login endpoint expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Email => "email",
        }
    }
}

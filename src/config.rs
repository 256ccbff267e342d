//! Configuration management for ocr-relay.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values
//!
//! Credentials and session state live in the credential store file, not
//! here; the `auth` and `upstream` sections only carry overrides that take
//! precedence over the store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Inbound authentication configuration.
    pub auth: AuthSection,
    /// Upstream OCR provider configuration.
    pub upstream: UpstreamSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the credential store file.
    pub store_path: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            store_path: PathBuf::from("ocr-relay.json"),
        }
    }
}

/// Inbound authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Static API key callers must present as a bearer token.
    /// Falls back to the credential store when unset.
    pub api_key: Option<String>,
}

/// Upstream OCR provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    /// Base URL of the upstream provider.
    pub base_url: String,
    /// Account username override (falls back to the credential store).
    pub username: Option<String>,
    /// Account password override (falls back to the credential store).
    pub password: Option<String>,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: u64,
    /// Job status poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum total wait for a job to end, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: "https://web.baimiaoapp.com".to_string(),
            username: None,
            password: None,
            http_timeout_secs: 15,
            poll_interval_ms: 200,
            poll_timeout_secs: 60,
        }
    }
}

impl UpstreamSection {
    /// Poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Poll deadline as a Duration.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Per-request HTTP timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("OCR_RELAY_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("OCR_RELAY_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(key) = std::env::var("OCR_RELAY_API_KEY") {
            if !key.is_empty() {
                self.auth.api_key = Some(key);
            }
        }

        if let Ok(username) = std::env::var("OCR_RELAY_USERNAME") {
            if !username.is_empty() {
                self.upstream.username = Some(username);
            }
        }

        if let Ok(password) = std::env::var("OCR_RELAY_PASSWORD") {
            if !password.is_empty() {
                self.upstream.password = Some(password);
            }
        }

        if let Ok(url) = std::env::var("OCR_RELAY_UPSTREAM_URL") {
            if !url.is_empty() {
                self.upstream.base_url = url;
            }
        }

        if let Ok(level) = std::env::var("OCR_RELAY_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref key) = args.api_key {
            self.auth.api_key = Some(key.clone());
        }

        if let Some(ref path) = args.store {
            self.server.store_path = path.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &crate::cli::Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

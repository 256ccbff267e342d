//! File-backed credential store.
//!
//! A small injected capability holding the upstream account credentials and
//! session state (device id, session token) plus the inbound API key, as a
//! flat JSON key-value object on disk. The file is re-read before every
//! lookup so that edits made outside the process are picked up, and
//! rewritten on every `set` so that later process runs reuse a live session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{OcrRelayError, Result};

/// Well-known store keys.
pub mod keys {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const DEVICE_ID: &str = "device_id";
    pub const SESSION_TOKEN: &str = "session_token";
    pub const API_KEY: &str = "api_key";
}

/// Key-value store persisted as a flat JSON object.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles between concurrent requests.
    lock: Mutex<()>,
}

impl CredentialStore {
    /// Open a store backed by the given file. The file is created lazily on
    /// the first `set`; a missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value. Empty strings read as `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let map = self.read_map()?;
        Ok(map.get(key).filter(|v| !v.is_empty()).cloned())
    }

    /// Store a value, rewriting the backing file.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    /// Store several values in one rewrite.
    pub fn set_many<'a, I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        self.write_map(&map)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

fn poisoned() -> OcrRelayError {
    OcrRelayError::Configuration("credential store lock poisoned".to_string())
}

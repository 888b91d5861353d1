use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The storage key the login flow writes the bearer token under.
pub const AUTH_TOKEN_KEY: &str = "token";

/// An opaque bearer credential, exactly as the login flow stored it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken(<redacted>)")
    }
}

/// No usable credential is available. Never retried; callers should route
/// the user to the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("Unauthenticated: no credential stored under `{key}`")]
    NotFound { key: String },
    #[error("Unauthenticated: stored credential is not a valid header value")]
    Malformed,
}

/// Client-side persistent key-value storage.
///
/// The API layer only ever reads from it; writes belong to whatever login
/// flow the front end provides.
pub trait TokenStore: Send + Sync {
    /// Look up the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: TokenStore + ?Sized> TokenStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Read the current token from the store.
///
/// Not cached: each call sees whatever the store holds right now, so a logout
/// is honoured by the very next request.
pub fn get_token(store: &dyn TokenStore) -> Result<AuthToken, AuthenticationError> {
    match store.get(AUTH_TOKEN_KEY) {
        Some(token) if !token.is_empty() => Ok(AuthToken(token)),
        _ => Err(AuthenticationError::NotFound {
            key: AUTH_TOKEN_KEY.to_string(),
        }),
    }
}

/// An in-memory store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key)
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

/// Errors writing to a [`FileStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access token store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Token store is not a JSON object: {0}")]
    Format(#[from] serde_json::Error),
}

/// A JSON object on disk, e.g. `{"token": "..."}`.
///
/// The file is re-read on every lookup. A missing file simply holds nothing.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }

    /// Store `value` under `key`, keeping any other entries.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    /// Remove `key`, returning whether anything was stored.
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.load()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save(&entries)?;
        }
        Ok(existed)
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!("Ignoring unreadable token store {}: {e}", self.path.display());
                None
            }
        }
    }
}

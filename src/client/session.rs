//! # Session Capabilities
//!
//! The gateway never touches storage or navigation directly. It is handed a
//! [`CredentialStore`] (where the bearer token and user profile live) and a
//! [`Navigator`] (where the client currently is, and how to send it to the
//! login page).
//!
//! ## Implementations
//!
//! - [`MemoryStore`]: process-local map, used by tests and short-lived tools
//! - [`FileStore`]: a JSON object on disk, one string value per key, so a
//!   token written by one run is seen by the next
//! - [`RecordingNavigator`]: tracks the current path and every redirect
//!
//! The store is shared mutable state. Concurrent requests read it at send
//! time and the 401 handler clears it from whichever response arrives first;
//! the last write wins.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Key of the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key of the opaque user profile blob.
pub const USER_KEY: &str = "user";

/// Page the client is sent to when its session is rejected.
pub const LOGIN_PATH: &str = "/login";

/// Page that must not trigger a login redirect either.
pub const REGISTER_PATH: &str = "/register";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session storage at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Key/value storage for the session credential.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Read the stored bearer token, if any.
pub fn access_token(store: &dyn CredentialStore) -> Result<Option<String>, SessionError> {
    store.get(ACCESS_TOKEN_KEY)
}

/// Persist a credential and optional user profile.
pub fn store_session(
    store: &dyn CredentialStore,
    token: &str,
    user: Option<&str>,
) -> Result<(), SessionError> {
    store.set(ACCESS_TOKEN_KEY, token)?;
    match user {
        Some(user) => store.set(USER_KEY, user),
        None => Ok(()),
    }
}

/// Delete both the credential and the user profile.
pub fn clear_session(store: &dyn CredentialStore) -> Result<(), SessionError> {
    store.remove(ACCESS_TOKEN_KEY)?;
    store.remove(USER_KEY)
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().map_err(|_| SessionError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Credential store persisted as a JSON object on disk.
///
/// A missing file reads as an empty store. Every operation re-reads the file,
/// so external writers (a login flow) are picked up on the next request.
///
/// I/O is synchronous `std::fs` and runs on the calling thread, including
/// the tokio worker that drives the interceptors. The file holds two short
/// strings, so this stays in the microsecond range; a store that grows past
/// that should move its reads and writes behind `tokio::task::spawn_blocking`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let io_err = |source: std::io::Error| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    /// An unreadable file is reset to an empty store, so clearing a session
    /// always leaves the client able to log in again.
    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().map_err(|_| SessionError::Poisoned)?;
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(SessionError::Corrupt { path, message }) => {
                warn!(
                    "Session file {} is corrupt ({}), resetting it",
                    path.display(),
                    message
                );
                return self.write_entries(&BTreeMap::new());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_some() {
            debug!("Removed '{}' from {}", key, self.path.display());
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Where the client is, and how to move it.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Full-page navigation; bypasses any client-side routing.
    fn redirect(&self, path: &str);
}

/// True when `path` is the login or registration page.
pub fn is_auth_page(path: &str) -> bool {
    path.contains(LOGIN_PATH) || path.contains(REGISTER_PATH)
}

#[derive(Debug)]
struct NavigationState {
    current: String,
    redirects: Vec<String>,
}

/// Navigator that records every redirect and moves its current path.
#[derive(Debug)]
pub struct RecordingNavigator {
    state: Mutex<NavigationState>,
}

impl RecordingNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigationState {
                current: path.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Every redirect target, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.redirects.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .map(|state| state.current.clone())
            .unwrap_or_default()
    }

    fn redirect(&self, path: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.current = path.to_string();
            state.redirects.push(path.to_string());
        }
    }
}

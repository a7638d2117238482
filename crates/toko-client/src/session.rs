//! # Session Cache
//!
//! Persists the `(user, token)` pair between runs so the client can
//! rehydrate a session at startup without re-prompting for credentials.
//!
//! The cache is written as TOML in the platform config directory. Tests
//! and embedders that do not want disk persistence use the in-memory
//! backend.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use toko_core::User;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to write session: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No session path available")]
    NoPath,
}

/// The persisted session payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Cached copy of the user; treated as provisional until `check_auth`
    /// re-validates the token against `/user`.
    #[serde(default)]
    pub user: Option<User>,
}

enum Backend {
    File(PathBuf),
    Memory(Mutex<Option<Session>>),
}

/// Session persistence with a file or in-memory backend.
pub struct SessionCache {
    backend: Backend,
}

impl SessionCache {
    /// Cache in the platform config directory, falling back to in-memory
    /// when no home directory exists (containers, CI).
    pub fn new() -> Self {
        match Self::default_path() {
            Some(path) => Self::at_path(path),
            None => {
                warn!("No config directory available, session will not persist");
                Self::in_memory()
            }
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        SessionCache {
            backend: Backend::File(path),
        }
    }

    pub fn in_memory() -> Self {
        SessionCache {
            backend: Backend::Memory(Mutex::new(None)),
        }
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("id", "toko", "toko")
            .map(|dirs| dirs.config_dir().join("session.toml"))
    }

    /// Loads the cached session, if any. Unreadable or corrupt caches are
    /// treated as absent.
    pub fn load(&self) -> Option<Session> {
        match &self.backend {
            Backend::Memory(slot) => slot.lock().ok()?.clone(),
            Backend::File(path) => {
                let contents = std::fs::read_to_string(path).ok()?;
                match toml::from_str(&contents) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        warn!(?path, "Discarding unreadable session cache: {}", e);
                        None
                    }
                }
            }
        }
    }

    pub fn store(&self, session: &Session) -> Result<(), SessionError> {
        match &self.backend {
            Backend::Memory(slot) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(session.clone());
                }
                Ok(())
            }
            Backend::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let contents = toml::to_string_pretty(session)?;
                std::fs::write(path, contents)?;
                debug!(?path, "Session cached");
                Ok(())
            }
        }
    }

    /// Removes any cached session. Best-effort: a missing file is fine.
    pub fn clear(&self) {
        match &self.backend {
            Backend::Memory(slot) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = None;
                }
            }
            Backend::File(path) => {
                if let Err(e) = std::fs::remove_file(path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(?path, "Failed to clear session cache: {}", e);
                    }
                }
            }
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let cache = SessionCache::in_memory();
        assert!(cache.load().is_none());

        let session = Session {
            token: "tok-123".to_string(),
            user: None,
        };
        cache.store(&session).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.token, "tok-123");

        cache.clear();
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("toko-session-{}", std::process::id()));
        let cache = SessionCache::at_path(dir.join("session.toml"));

        let session = Session {
            token: "tok-456".to_string(),
            user: None,
        };
        cache.store(&session).unwrap();
        assert_eq!(cache.load().unwrap().token, "tok-456");

        cache.clear();
        assert!(cache.load().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}

//! Session token persistence
//!
//! The console holds at most one identity token. It is written after a
//! successful login and cleared on logout or when the server rejects it with
//! a 401. Holding a token says nothing about whether the server still
//! accepts it.
//!
//! On unix the token file is created owner-only (`0o600`).

use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Fixed key the token is stored under
pub const TOKEN_KEY: &str = "auth_token";

/// Errors from token persistence
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the token file failed
    #[error("Token file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The token file is not a JSON object
    #[error("Token file {path} is not valid JSON: {source}")]
    Format {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted slot for the identity token
pub trait TokenStorage: Send + Sync {
    /// Store `token`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the token could not be persisted.
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// The stored token, if any
    fn load(&self) -> Option<String>;

    /// Forget the stored token
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the slot could not be rewritten.
    fn clear(&self) -> Result<(), SessionError>;

    /// `Bearer <token>` for callers that talk to the server outside the
    /// pipeline (upload forms and the like)
    fn authorization_header(&self) -> Option<String> {
        self.load().map(|token| format!("Bearer {token}"))
    }
}

/// Token kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `token`
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token kept in a small JSON key/value file so it survives restarts
///
/// Other keys in the file are left untouched. A missing file means no token.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    guard: Mutex<()>,
}

impl FileTokenStorage {
    /// Storage backed by `path`; the file is created on first save
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            },
        };

        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&text).map_err(|source| SessionError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), SessionError> {
        let text = serde_json::to_string_pretty(entries).map_err(|source| SessionError::Format {
            path: self.path.clone(),
            source,
        })?;

        let io_error = |source: std::io::Error| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);

            // `mode` only applies on creation; tighten files left by older runs
            let loose = fs::metadata(&self.path)
                .is_ok_and(|metadata| metadata.permissions().mode() & 0o077 != 0);
            if loose {
                fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                    .map_err(io_error)?;
            }
        }

        let mut file = options.open(&self.path).map_err(io_error)?;
        file.write_all(text.as_bytes()).map_err(io_error)
    }
}

impl TokenStorage for FileTokenStorage {
    fn save(&self, token: &str) -> Result<(), SessionError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write(&entries)
    }

    fn load(&self) -> Option<String> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read() {
            Ok(mut entries) => match entries.remove(TOKEN_KEY) {
                Some(Value::String(token)) => Some(token),
                _ => None,
            },
            Err(error) => {
                tracing::warn!(%error, "Ignoring unreadable token file");
                None
            },
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        if entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write(&entries)
    }
}

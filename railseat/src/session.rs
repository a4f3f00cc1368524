//! Session credential and where it is kept between runs.
//!
//! A [`Session`] is the bearer token handed to every authenticated call. It is
//! passed explicitly to the operations that need it; nothing reads a global.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Bearer token issued by the backend at sign-up or sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token, rejecting blank ones.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() { None } else { Some(Self(token)) }
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: AuthToken,
}

impl Session {
    /// Start a session from a token.
    #[must_use]
    pub const fn new(token: AuthToken) -> Self {
        Self { token }
    }

    /// The session's bearer token.
    #[must_use]
    pub const fn token(&self) -> &AuthToken {
        &self.token
    }
}

/// Errors from reading or writing the stored credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Filesystem access failed.
    #[error("Credential file {path}: {source}")]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Key-value slot holding the one persisted token.
pub trait CredentialStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<AuthToken>, CredentialError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be written.
    fn save(&self, token: &AuthToken) -> Result<(), CredentialError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be written.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Token kept in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store the token at `path`; parent directories are created on save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<AuthToken>, CredentialError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(AuthToken::new(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, token: &AuthToken) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, token.as_str()).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "Saved credential");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed credential");
                Ok(())
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Token held in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `token`.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<AuthToken>, CredentialError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

//! Session state shared by every sub-client
//!
//! The store keeps the bearer token and the signed-in user together, in
//! memory and optionally in a `session.json` under the OS config directory.
//! Sub-clients receive a cloned handle; there is no global session.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Environment variable overriding the session directory
pub const SESSION_DIR_ENV: &str = "PACKLIST_CONFIG_DIR";

const APP_DIR: &str = "packlist";
const SESSION_FILE: &str = "session.json";

/// A user account as reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    /// Creation timestamp as emitted by the service (naive ISO-8601)
    pub created_at: String,
}

/// An authenticated session: the bearer token and the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Cloneable handle to the current session
///
/// Token and user are stored and removed together; callers never observe
/// one without the other.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Create a store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// Create a store persisted under the default directory
    ///
    /// The directory is `$PACKLIST_CONFIG_DIR` when set, otherwise the OS
    /// config directory plus `packlist/`. An existing session file is
    /// loaded; an unreadable one is logged and ignored.
    pub fn persistent() -> Result<Self, Error> {
        let dir = Self::default_dir()
            .ok_or_else(|| Error::session("could not resolve a config directory"))?;
        Ok(Self::persistent_at(dir))
    }

    /// Create a store persisted under an explicit directory
    pub fn persistent_at(dir: impl Into<PathBuf>) -> Self {
        let path = dir.into().join(SESSION_FILE);
        let session = Self::load(&path);
        Self {
            inner: Arc::new(RwLock::new(session)),
            path: Some(path),
        }
    }

    fn default_dir() -> Option<PathBuf> {
        if let Ok(dir) = env::var(SESSION_DIR_ENV) {
            return Some(PathBuf::from(dir));
        }
        dirs::config_dir().map(|base| base.join(APP_DIR))
    }

    fn load(path: &Path) -> Option<Session> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("could not read session file {}: {}", path.display(), err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("ignoring malformed session file {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Store a new session, replacing any previous one
    ///
    /// The session is written to disk first; on failure the in-memory
    /// state is left untouched.
    pub fn set_session(&self, token: &str, user: User) -> Result<(), Error> {
        let session = Session {
            token: token.to_string(),
            user,
        };
        if let Some(path) = &self.path {
            Self::persist(path, &session)?;
        }
        let mut current = self.inner.write().unwrap();
        *current = Some(session);
        Ok(())
    }

    fn persist(path: &Path, session: &Session) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(session)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Remove the session from memory and disk
    ///
    /// Clearing an already-empty store is not an error.
    pub fn clear(&self) -> Result<(), Error> {
        {
            let mut current = self.inner.write().unwrap();
            *current = None;
        }
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// The current session, if any
    pub fn session(&self) -> Option<Session> {
        self.inner.read().unwrap().clone()
    }

    /// The current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// The current user, if any
    pub fn user(&self) -> Option<User> {
        self.inner
            .read()
            .unwrap()
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// Whether a session (and with it a token) is present
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap().is_some()
    }

    /// Whether the signed-in user is an administrator
    ///
    /// False when no session is present. Purely local; the token itself
    /// is never inspected.
    pub fn is_admin(&self) -> bool {
        self.inner
            .read()
            .unwrap()
            .as_ref()
            .map(|session| session.user.is_admin)
            .unwrap_or(false)
    }
}

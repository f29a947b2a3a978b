//! Configuration options for the packing list client

use std::path::PathBuf;
use std::time::Duration;

/// Configuration options for the packing list client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout applied to every HTTP call
    ///
    /// None by default: an in-flight request runs until the transport
    /// settles it.
    pub request_timeout: Option<Duration>,

    /// Path prefix the API is mounted under
    pub api_prefix: String,

    /// Whether to persist the session to disk
    pub persist_session: bool,

    /// Directory for the session file; resolved from the environment or
    /// the OS config directory when unset
    pub session_dir: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            api_prefix: "/api".to_string(),
            persist_session: true,
            session_dir: None,
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the path prefix the API is mounted under
    pub fn with_api_prefix(mut self, value: &str) -> Self {
        self.api_prefix = value.to_string();
        self
    }

    /// Set whether to persist the session to disk
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the directory for the session file
    pub fn with_session_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(value.into());
        self
    }
}

//! Error handling for the packing list client

use std::fmt;
use reqwest::StatusCode;
use thiserror::Error;

use crate::file::FileError;

/// Unified error type for the packing list client
#[derive(Error, Debug)]
pub enum Error {
    /// The service answered with a non-success status.
    ///
    /// `message` carries the `error` field of the response body when the
    /// service provided one, otherwise the fallback message of the
    /// operation that failed.
    #[error("{message}")]
    Api {
        /// HTTP status of the response
        status: StatusCode,
        /// Server-provided or fallback error message
        message: String,
    },

    /// The request never produced a response (connection refused, DNS
    /// failure, timeout). Distinct from `Api`: the service was not reached.
    #[error("No response from server: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// Other HTTP transport errors (body read, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// File system errors (reading a file to upload, session persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File validation failures, raised before any network call
    #[error(transparent)]
    File(#[from] FileError),

    /// Other client-side validation failures, raised before any network call
    #[error("{0}")]
    Validation(String),

    /// Session store errors
    #[error("Session error: {0}")]
    Session(String),
}

impl Error {
    /// Create a new API error
    pub fn api<T: fmt::Display>(status: StatusCode, msg: T) -> Self {
        Error::Api {
            status,
            message: msg.to_string(),
        }
    }

    /// Create a new client-side validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new session error
    pub fn session<T: fmt::Display>(msg: T) -> Self {
        Error::Session(msg.to_string())
    }

    /// The HTTP status of an `Api` error, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

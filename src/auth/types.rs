//! Types for authentication requests and responses

use serde::{Deserialize, Serialize};

use crate::session::User;

/// Body of a successful login or registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Human-readable confirmation from the service
    pub message: String,
    /// Bearer token for subsequent requests
    pub token: String,
    /// The account that signed in or was created
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

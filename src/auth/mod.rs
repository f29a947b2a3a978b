//! Authentication against the packing list service
//!
//! Login and registration store the returned token and user in the shared
//! [`SessionStore`] before returning, so other sub-clients pick up the
//! credentials immediately. Logout is purely local: the service keeps no
//! server-side session, so clearing the store is all there is to do.

mod types;

use reqwest::Client;

use crate::error::Error;
use crate::fetch::Fetch;
use crate::session::SessionStore;

pub use types::*;

/// Client for authentication operations
pub struct AuthClient {
    base: String,
    client: Client,
    session: SessionStore,
}

impl AuthClient {
    pub(crate) fn new(base: &str, client: Client, session: SessionStore) -> Self {
        Self {
            base: base.to_string(),
            client,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth{}", self.base, path)
    }

    /// Sign in with username and password
    ///
    /// On success the session store holds the new token and user. Bad
    /// credentials surface as an `Api` error with the service's message
    /// (`Invalid username or password`).
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.endpoint("/login");

        let result = Fetch::post(&self.client, &url)
            .json(&Credentials { username, password })?
            .error_context("Login failed")
            .execute::<AuthResponse>()
            .await?;

        self.session.set_session(&result.token, result.user.clone())?;

        Ok(result)
    }

    /// Create an account and sign it in
    ///
    /// The service answers 409 `Username already exists` for a taken name.
    /// New accounts are regular users; only the service grants admin.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.endpoint("/register");

        let result = Fetch::post(&self.client, &url)
            .json(&Credentials { username, password })?
            .error_context("Registration failed")
            .execute::<AuthResponse>()
            .await?;

        self.session.set_session(&result.token, result.user.clone())?;

        Ok(result)
    }

    /// Sign out by clearing the stored session
    ///
    /// No network call is made; an expired or invalid token needs no
    /// server-side cleanup.
    pub fn logout(&self) -> Result<(), Error> {
        self.session.clear()
    }
}

/// Check a username against the rules the service enforces
///
/// Mirrors the server's limits for inline form feedback; the server remains
/// authoritative and is not consulted here.
pub fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() {
        return Err(Error::validation("Username is required"));
    }
    let length = username.chars().count();
    if length < 3 {
        return Err(Error::validation(
            "Username must be at least 3 characters long",
        ));
    }
    if length > 50 {
        return Err(Error::validation(
            "Username must be less than 50 characters",
        ));
    }
    let allowed = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !allowed {
        return Err(Error::validation(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Check a password against the rules the service enforces
pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.is_empty() {
        return Err(Error::validation("Password is required"));
    }
    let length = password.chars().count();
    if length < 6 {
        return Err(Error::validation(
            "Password must be at least 6 characters long",
        ));
    }
    if length > 128 {
        return Err(Error::validation(
            "Password must be less than 128 characters",
        ));
    }
    Ok(())
}

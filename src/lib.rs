//! Packing List Client Library
//!
//! A Rust client for a packing-list processing service: authentication
//! with role-separated areas, spreadsheet upload with progress and
//! client-side validation, review workflow, reference-data management
//! (price lists, duty rates) and paginated record browsing.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod file;
pub mod records;
pub mod routes;
pub mod session;
pub mod uploads;

use log::warn;
use reqwest::Client;

use crate::admin::AdminClient;
use crate::auth::AuthClient;
use crate::config::ClientOptions;
use crate::routes::{Access, Route};
use crate::session::SessionStore;
use crate::uploads::UploadsClient;

/// The main entry point for the packing list client
pub struct PackListClient {
    /// Service URL including the API prefix
    pub api_base: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    session: SessionStore,
}

impl PackListClient {
    /// Create a new client with default options
    ///
    /// # Arguments
    ///
    /// * `base_url` - Where the service is reachable, without the API prefix
    ///
    /// # Example
    ///
    /// ```
    /// use packlist_client::PackListClient;
    ///
    /// let client = PackListClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: &str) -> Self {
        Self::new_with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// When session persistence is enabled but no session directory can be
    /// resolved, the client falls back to an in-memory session store and
    /// logs a warning.
    ///
    /// # Example
    ///
    /// ```
    /// use packlist_client::{PackListClient, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_persist_session(false);
    /// let client = PackListClient::new_with_options("http://localhost:5000", options);
    /// ```
    pub fn new_with_options(base_url: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|_| Client::new());

        let session = if options.persist_session {
            let store = match &options.session_dir {
                Some(dir) => Ok(SessionStore::persistent_at(dir.clone())),
                None => SessionStore::persistent(),
            };
            match store {
                Ok(store) => store,
                Err(err) => {
                    warn!("session persistence unavailable ({}), using in-memory store", err);
                    SessionStore::in_memory()
                }
            }
        } else {
            SessionStore::in_memory()
        };

        let api_base = format!("{}{}", base_url.trim_end_matches('/'), options.api_prefix);

        Self {
            api_base,
            http_client,
            options,
            session,
        }
    }

    /// Get a client for authentication operations
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(&self.api_base, self.http_client.clone(), self.session.clone())
    }

    /// Get a client for the signed-in user's upload operations
    pub fn uploads(&self) -> UploadsClient {
        UploadsClient::new(&self.api_base, self.http_client.clone(), self.session.clone())
    }

    /// Get a client for administrative operations
    pub fn admin(&self) -> AdminClient {
        AdminClient::new(&self.api_base, self.http_client.clone(), self.session.clone())
    }

    /// The session store shared by all sub-clients
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Decide whether the current session may enter a route
    ///
    /// # Example
    ///
    /// ```
    /// use packlist_client::{PackListClient, config::ClientOptions};
    /// use packlist_client::routes::{Access, Route};
    ///
    /// let options = ClientOptions::default().with_persist_session(false);
    /// let client = PackListClient::new_with_options("http://localhost:5000", options);
    /// assert_eq!(client.route_access(Route::Dashboard), Access::Redirect(Route::Login));
    /// ```
    pub fn route_access(&self, route: Route) -> Access {
        routes::resolve(
            route,
            self.session.is_authenticated(),
            self.session.is_admin(),
        )
    }

    /// The route the current session lands on by default
    pub fn home_route(&self) -> Route {
        routes::home(self.session.is_authenticated(), self.session.is_admin())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::file::SelectedFile;
    pub use crate::PackListClient;
}

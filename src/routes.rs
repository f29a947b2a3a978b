//! Role-gated navigation
//!
//! Pure predicates deciding whether a session may enter a screen and
//! where to send it otherwise. Authentication is always checked before
//! authorization: a signed-out visitor to the admin screen goes to the
//! login screen, not the dashboard.

/// The navigable screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Admin,
}

impl Route {
    /// The path this screen lives at
    pub fn as_path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
        }
    }

    /// Parse a path, tolerating a trailing slash
    pub fn from_path(path: &str) -> Option<Route> {
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        match path {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/dashboard" => Some(Route::Dashboard),
            "/admin" => Some(Route::Admin),
            _ => None,
        }
    }

    /// Whether the screen requires a signed-in session
    pub const fn requires_auth(self) -> bool {
        matches!(self, Route::Dashboard | Route::Admin)
    }

    /// Whether the screen additionally requires the admin role
    pub const fn admin_only(self) -> bool {
        matches!(self, Route::Admin)
    }
}

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Enter the requested screen
    Grant,
    /// Go to this screen instead
    Redirect(Route),
}

/// Decide whether a session may enter a route
///
/// Protected screens send signed-out sessions to [`Route::Login`] and
/// non-admins at [`Route::Admin`] to [`Route::Dashboard`]. The auth
/// screens bounce signed-in sessions to their role's home.
pub fn resolve(route: Route, authenticated: bool, admin: bool) -> Access {
    if route.requires_auth() {
        if !authenticated {
            return Access::Redirect(Route::Login);
        }
        if route.admin_only() && !admin {
            return Access::Redirect(Route::Dashboard);
        }
        Access::Grant
    } else if authenticated {
        Access::Redirect(home(authenticated, admin))
    } else {
        Access::Grant
    }
}

/// The screen a session lands on by default
pub fn home(authenticated: bool, admin: bool) -> Route {
    if !authenticated {
        Route::Login
    } else if admin {
        Route::Admin
    } else {
        Route::Dashboard
    }
}

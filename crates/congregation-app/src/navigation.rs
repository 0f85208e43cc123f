//! # Role-Gated Navigation
//!
//! Maps an [`AuthSnapshot`] to the views a frontend may route to.
//!
//! ```text
//! Anonymous ──session──→ AuthenticatedUnresolved ──profile──→ Authenticated{Standard|Elevated}
//!     ↑                                                              │
//!     └──────────────────── sign-out / session → None ───────────────┘
//! ```
//!
//! The admin route is *registered* only for elevated profiles: for anyone
//! else `/admin` has nothing to match, exactly like an unknown path.
//! Everything here is a pure function of the snapshot and is recomputed on
//! every call.

use crate::views::{AuthSnapshot, BootstrapPhase};
use serde::{Deserialize, Serialize};

/// A top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Sign-in / sign-up screen
    SignIn,
    /// Landing view after sign-in
    Dashboard,
    /// About the church
    About,
    /// Events calendar
    Events,
    /// Ministries and groups
    Groups,
    /// Member directory
    Members,
    /// Photo and video gallery
    Media,
    /// Prayer-request intake and history
    PrayerRequests,
    /// Admin permission panel
    Admin,
}

impl Route {
    /// Standard views, in menu order.
    pub const STANDARD: [Route; 7] = [
        Route::Dashboard,
        Route::About,
        Route::Events,
        Route::Groups,
        Route::Members,
        Route::Media,
        Route::PrayerRequests,
    ];

    /// Default view after sign-in.
    pub const LANDING: Route = Route::Dashboard;

    /// URL path of the view.
    pub fn path(&self) -> &'static str {
        match self {
            Self::SignIn => "/",
            Self::Dashboard => "/dashboard",
            Self::About => "/about",
            Self::Events => "/events",
            Self::Groups => "/groups",
            Self::Members => "/members",
            Self::Media => "/media",
            Self::PrayerRequests => "/prayer-requests",
            Self::Admin => "/admin",
        }
    }

    /// Menu label of the view.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::Dashboard => "Home",
            Self::About => "About Us",
            Self::Events => "Events",
            Self::Groups => "Groups",
            Self::Members => "Members",
            Self::Media => "Photos & Videos",
            Self::PrayerRequests => "Prayer Requests",
            Self::Admin => "Admin Settings",
        }
    }

    /// Whether the view belongs to the standard signed-in set.
    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }

    fn all() -> impl Iterator<Item = Route> {
        std::iter::once(Route::SignIn)
            .chain(Self::STANDARD)
            .chain(std::iter::once(Route::Admin))
    }

    /// Match a path against every known view, ignoring a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        let normalized = if normalized.is_empty() { "/" } else { normalized };
        Self::all().find(|route| route.path() == normalized)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Access level of a resolved profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Regular member
    Standard,
    /// Profile carries the elevated flag
    Elevated,
}

/// Navigation state derived from the auth snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavState {
    /// No session
    Anonymous,
    /// Session held, profile not resolved (yet)
    AuthenticatedUnresolved,
    /// Session and profile held
    Authenticated {
        /// Access granted by the profile
        access: Access,
    },
}

impl NavState {
    /// Derive the state from a snapshot.
    pub fn from_snapshot(snapshot: &AuthSnapshot) -> Self {
        match (&snapshot.session, &snapshot.profile) {
            (None, _) => Self::Anonymous,
            (Some(_), None) => Self::AuthenticatedUnresolved,
            (Some(_), Some(profile)) => Self::Authenticated {
                access: if profile.elevated {
                    Access::Elevated
                } else {
                    Access::Standard
                },
            },
        }
    }

    /// Whether a session is held.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Whether the admin view is registered.
    pub fn is_elevated(&self) -> bool {
        matches!(
            self,
            Self::Authenticated {
                access: Access::Elevated
            }
        )
    }

    /// Routes registered in this state.
    pub fn registered_routes(&self) -> Vec<Route> {
        let mut routes = vec![Route::SignIn];
        routes.extend(Route::STANDARD);
        if self.is_elevated() {
            routes.push(Route::Admin);
        }
        routes
    }

    /// Routes that render without redirecting.
    pub fn reachable_routes(&self) -> Vec<Route> {
        if self.is_authenticated() {
            self.registered_routes()
                .into_iter()
                .filter(|route| *route != Route::SignIn)
                .collect()
        } else {
            vec![Route::SignIn]
        }
    }

    /// Resolve a requested route.
    pub fn resolve(&self, route: Route) -> Resolution {
        if !self.registered_routes().contains(&route) {
            return Resolution::NoMatch;
        }
        match (self.is_authenticated(), route) {
            (false, Route::SignIn) => Resolution::Render(Route::SignIn),
            (false, _) => Resolution::Redirect(Route::SignIn),
            (true, Route::SignIn) => Resolution::Redirect(Route::LANDING),
            (true, route) => Resolution::Render(route),
        }
    }

    /// Resolve a requested path.
    pub fn resolve_path(&self, path: &str) -> Resolution {
        match Route::from_path(path) {
            Some(route) => self.resolve(route),
            None => Resolution::NoMatch,
        }
    }

    /// Sidebar entries, in display order.
    pub fn menu(&self) -> Vec<Route> {
        if self.is_authenticated() {
            self.reachable_routes()
        } else {
            Vec::new()
        }
    }
}

/// Outcome of routing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Render this view
    Render(Route),
    /// Navigate to this view instead
    Redirect(Route),
    /// No registered route matches
    NoMatch,
}

/// What the frontend should put on screen for the whole application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    /// Startup in progress
    Loading {
        /// Loading message
        message: String,
        /// Whether to show the slow-connection badge
        slow: bool,
    },
    /// Backend unreachable; offer a retry
    ConnectionError {
        /// User-facing explanation
        message: String,
    },
    /// Routed application
    Routed {
        /// Navigation state
        nav: NavState,
        /// Whether to show a retry affordance (startup gave up waiting)
        offer_retry: bool,
    },
}

impl Screen {
    /// Choose the top-level screen for a snapshot.
    pub fn from_snapshot(snapshot: &AuthSnapshot) -> Self {
        match &snapshot.phase {
            BootstrapPhase::Loading | BootstrapPhase::Slow => Self::Loading {
                message: snapshot.loading_message().unwrap_or_default().to_string(),
                slow: snapshot.phase.is_slow(),
            },
            BootstrapPhase::Failed { message } => Self::ConnectionError {
                message: message.clone(),
            },
            BootstrapPhase::TimedOut | BootstrapPhase::Ready => Self::Routed {
                nav: NavState::from_snapshot(snapshot),
                offer_retry: snapshot.phase.offers_retry(),
            },
        }
    }

    /// Resolve a path on this screen; `None` while nothing is routed.
    pub fn resolve_path(&self, path: &str) -> Option<Resolution> {
        match self {
            Self::Routed { nav, .. } => Some(nav.resolve_path(path)),
            _ => None,
        }
    }
}

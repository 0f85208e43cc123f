//! UI-facing facade for congregation-app.
//!
//! This module exposes the narrow surface that frontends should use:
//! - workflows (commands)
//! - signals (read/subscribe)
//! - core types (AuthContext, AppConfig)

use crate::core::AuthContext;
use crate::navigation::{Resolution, Screen};

/// UI wrapper around `AuthContext` to discourage direct access to internals.
#[derive(Clone, Debug)]
pub struct UiAuthContext {
    inner: AuthContext,
}

impl UiAuthContext {
    /// Wrap a context.
    pub fn new(inner: AuthContext) -> Self {
        Self { inner }
    }

    /// Underlying context, for workflow calls.
    pub fn raw(&self) -> &AuthContext {
        &self.inner
    }

    /// Screen to render right now.
    pub fn screen(&self) -> Screen {
        Screen::from_snapshot(&self.inner.snapshot())
    }

    /// Resolve `path` against the current screen.
    ///
    /// `None` while the startup sequence still owns the screen.
    pub fn navigate(&self, path: &str) -> Option<Resolution> {
        self.screen().resolve_path(path)
    }
}

impl From<AuthContext> for UiAuthContext {
    fn from(inner: AuthContext) -> Self {
        Self::new(inner)
    }
}

pub mod signals {
    //! Reactive reads.
    pub use futures_signals::signal::{Signal, SignalExt};
}

pub mod workflows {
    //! Commands.
    pub use crate::workflows::admin;
    pub use crate::workflows::auth;
}

pub mod types {
    //! Plain data the UI renders.
    pub use crate::config::AppConfig;
    pub use crate::core::AuthContext;
    pub use crate::errors::{AppError, ErrorCategory};
    pub use crate::navigation::{Access, NavState, Resolution, Route, Screen};
    pub use crate::views::{
        AdminPanelState, AuthSnapshot, BootstrapPhase, Profile, ToastLevel,
    };
    pub use crate::workflows::auth::SignUpResult;
}

//! Authorization helpers for frontends.
//!
//! This module provides portable authorization checking for operations.
//! It includes:
//! - `AuthorizationLevel`: Classification of operations by sensitivity
//! - `require_*` helpers: Pre-check functions run before calling the gateway
//!
//! These checks only decide what the UI offers; the backend enforces its own
//! row-level rules and may still answer `PermissionDenied`.

use crate::errors::{AppError, AuthFailure};
use crate::navigation::{Access, NavState};
use crate::views::AuthSnapshot;

// ============================================================================
// Authorization Levels
// ============================================================================

/// Authorization level required for an operation.
///
/// Levels are ordered: Public < Member < Admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthorizationLevel {
    /// No session required (sign-in, sign-up)
    Public,
    /// Signed-in member
    Member,
    /// Elevated profile (permission management, content moderation)
    Admin,
}

impl AuthorizationLevel {
    /// Check if this level requires a session.
    #[inline]
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Check if this level requires an elevated profile.
    #[inline]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Get human-readable description for UI display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Public => "public access",
            Self::Member => "a signed-in member",
            Self::Admin => "administrator access",
        }
    }
}

impl std::fmt::Display for AuthorizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Highest level the navigation state grants.
pub fn granted_level(nav: NavState) -> AuthorizationLevel {
    match nav {
        NavState::Anonymous => AuthorizationLevel::Public,
        NavState::AuthenticatedUnresolved
        | NavState::Authenticated {
            access: Access::Standard,
        } => AuthorizationLevel::Member,
        NavState::Authenticated {
            access: Access::Elevated,
        } => AuthorizationLevel::Admin,
    }
}

/// Check `level` against the snapshot.
pub fn check_level(
    snapshot: &AuthSnapshot,
    level: AuthorizationLevel,
    operation: &str,
) -> Result<(), AppError> {
    let granted = granted_level(NavState::from_snapshot(snapshot));
    if granted >= level {
        return Ok(());
    }
    if granted == AuthorizationLevel::Public {
        Err(AppError::auth(
            AuthFailure::NotSignedIn,
            format!("{operation} requires {}", AuthorizationLevel::Member),
        ))
    } else {
        Err(AppError::permission_denied(format!(
            "{operation} requires {level}"
        )))
    }
}

/// Require a signed-in session.
pub fn require_member(snapshot: &AuthSnapshot, operation: &str) -> Result<(), AppError> {
    check_level(snapshot, AuthorizationLevel::Member, operation)
}

/// Require an elevated profile.
pub fn require_admin(snapshot: &AuthSnapshot, operation: &str) -> Result<(), AppError> {
    check_level(snapshot, AuthorizationLevel::Admin, operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use crate::gateway::{AuthUser, Session, UserId};
    use crate::views::Profile;

    fn snapshot(elevated: Option<bool>) -> AuthSnapshot {
        AuthSnapshot {
            session: Some(Session {
                access_token: "t".into(),
                user: AuthUser {
                    id: UserId::new("u"),
                    email: None,
                    full_name: None,
                },
            }),
            profile: elevated.map(|elevated| Profile {
                id: UserId::new("u"),
                email: String::new(),
                name: "u".into(),
                elevated,
            }),
            ..AuthSnapshot::default()
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(AuthorizationLevel::Public < AuthorizationLevel::Member);
        assert!(AuthorizationLevel::Member < AuthorizationLevel::Admin);
        assert!(!AuthorizationLevel::Public.requires_auth());
        assert!(AuthorizationLevel::Admin.requires_admin());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&snapshot(Some(true)), "toggle admin").is_ok());

        let err = require_admin(&snapshot(Some(false)), "toggle admin").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Capability);
        assert_eq!(err.code(), "AUTH_PERMISSION");

        let err = require_admin(&snapshot(None), "toggle admin").unwrap_err();
        assert_eq!(err.code(), "AUTH_PERMISSION");

        let err = require_admin(&AuthSnapshot::default(), "toggle admin").unwrap_err();
        assert_eq!(err.code(), "AUTH_SIGNED_OUT");
    }

    #[test]
    fn test_require_member() {
        assert!(require_member(&snapshot(None), "list").is_ok());
        assert!(require_member(&AuthSnapshot::default(), "list").is_err());
    }
}

//! # Gateway: Abstract Backend Operations
//!
//! This module defines the `Gateway` trait, which abstracts every operation
//! that reaches the hosted database/auth/storage service. This enables
//! `congregation-app` to remain a pure application core without a direct
//! dependency on the backend's client SDK.
//!
//! ## Design
//!
//! ```text
//! congregation-app (pure)      frontend / host
//! ┌─────────────────┐          ┌──────────────────┐
//! │ AuthContext     │          │ hosted-service   │
//! │   ┌──────────┐  │          │ client           │
//! │   │ Gateway  │◄─┼──────────│   implements     │
//! │   └──────────┘  │          │   Gateway        │
//! └─────────────────┘          └──────────────────┘
//! ```
//!
//! Failures cross the boundary as [`GatewayError`], a tagged type, so callers
//! never have to inspect message text to tell "no row" from "no network".
//!
//! ## Usage
//!
//! ```rust,ignore
//! let gateway: BoxedGateway = Arc::new(MemoryGateway::new());
//! let context = AuthContext::new(gateway, AppConfig::default());
//! context.start().await;
//! ```

pub mod memory;

use crate::errors::GatewayError;
use crate::views::profile::{NewProfile, Profile, ProfileUpdate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

pub use memory::MemoryGateway;

// =============================================================================
// Identity Types
// =============================================================================

/// Identity of an authenticated user, as issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identity
    pub id: UserId,
    /// Email address, if the identity service exposes one
    pub email: Option<String>,
    /// Full name supplied at sign-up
    pub full_name: Option<String>,
}

impl AuthUser {
    /// Email address, or the empty string when the identity has none.
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Proof of authentication for the current user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential; opaque to the core and never serialized
    #[serde(skip_serializing, default)]
    pub access_token: String,
    /// Authenticated user
    pub user: AuthUser,
}

impl Session {
    /// Identity of the session's user.
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Email/password pair for sign-in and sign-up.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Whether the identity service requires email confirmation before sign-in
    pub confirmation_required: bool,
}

// =============================================================================
// Session Change Subscription
// =============================================================================

/// A session-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// The new session, or `None` after sign-out/expiry
    pub session: Option<Session>,
}

type ReleaseFn = Box<dyn FnOnce() + Send + Sync>;

/// Handle to a long-lived session-change subscription.
///
/// The release hook runs exactly once: on [`SessionSubscription::unsubscribe`]
/// or, failing that, when the handle is dropped.
pub struct SessionSubscription {
    receiver: mpsc::UnboundedReceiver<SessionChange>,
    release: Option<ReleaseFn>,
}

impl SessionSubscription {
    /// Wrap a notification channel and the hook that detaches it.
    pub fn new(
        receiver: mpsc::UnboundedReceiver<SessionChange>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Wait for the next notification; `None` once the gateway hangs up.
    pub async fn next_change(&mut self) -> Option<SessionChange> {
        self.receiver.recv().await
    }

    /// Whether the subscription has not been released yet.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Detach from the gateway.
    pub fn unsubscribe(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if let Some(release) = self.release.take() {
            self.receiver.close();
            release();
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Bridge trait for backend operations
///
/// This trait defines the interface between the pure application core and the
/// hosted backend. It enables:
///
/// - **Decoupling**: The core doesn't know about the backend's SDK
/// - **Testability**: [`MemoryGateway`] for unit and integration tests
/// - **Portability**: Different clients for different platforms
#[async_trait]
pub trait Gateway: Send + Sync {
    // =========================================================================
    // Sessions
    // =========================================================================

    /// Get the current session, if any.
    ///
    /// A missing session is `Ok(None)`; implementations may also report it as
    /// [`GatewayError::NotFound`], which callers treat the same way.
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    /// Subscribe to session changes for the lifetime of the returned handle.
    fn subscribe_session_changes(&self) -> SessionSubscription;

    /// Sign in with email and password; emits a session change on success.
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, GatewayError>;

    /// Register a new account carrying `full_name` as user metadata.
    async fn sign_up(
        &self,
        credentials: &Credentials,
        full_name: &str,
    ) -> Result<SignUpOutcome, GatewayError>;

    /// End the current session; emits a session change to `None`.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Nullable lookup of the profile owned by `id`.
    async fn find_profile(&self, id: &UserId) -> Result<Option<Profile>, GatewayError>;

    /// Insert a profile row and return it as stored.
    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile, GatewayError>;

    /// Apply a partial update to the profile owned by `id`.
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate)
        -> Result<(), GatewayError>;

    /// All profiles, ordered by name.
    async fn list_profiles(&self) -> Result<Vec<Profile>, GatewayError>;
}

/// Shared gateway handle.
pub type BoxedGateway = Arc<dyn Gateway>;

//! Bootstrap Workflow - Session and Profile Startup
//!
//! Establishes the session (or its absence) and the matching profile before
//! any protected view is reachable.
//!
//! ## Sequence
//!
//! ```text
//! begin attempt (Loading, timers armed, listener subscribed)
//!        ↓
//! current_session() ── transport error ──→ Failed
//!        ↓ none / not found
//!      Ready
//!        ↓ some
//! resolve profile (find, else insert default) → Ready
//! ```
//!
//! Timers run beside the fetch: `Slow` after `slow_after`, `TimedOut` after
//! `give_up_after`. Whichever settles first wins; later results for the same
//! attempt are dropped.

use crate::core::context::{Adoption, AuthContext};
use crate::errors::GatewayError;
use crate::gateway::{Session, SessionChange};
use crate::views::{BootstrapPhase, NewProfile};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Message shown on the error screen when the backend is unreachable.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Could not connect to the server. The database may be under maintenance or waking up.";

/// Run one bootstrap attempt to completion.
pub(crate) async fn run(context: &AuthContext) {
    if context.is_disposed() {
        warn!("bootstrap requested on a disposed auth context");
        return;
    }

    context.ensure_listener();
    let epoch = context.begin_attempt();
    let observed_generation = context.current_generation();

    let session = match context.gateway().current_session().await {
        Ok(session) => session,
        Err(err) if err.is_not_found() => {
            debug!(epoch, "no stored session");
            None
        }
        Err(err) => {
            fail(context, epoch, &err);
            return;
        }
    };

    match context.adopt_fetched_session(epoch, observed_generation, session.clone()) {
        Adoption::Stale => {
            warn!(epoch, "discarding session fetched after bootstrap settled");
        }
        Adoption::Superseded => {
            debug!(epoch, "session changed during bootstrap; keeping notified session");
            settle_ready(context, epoch);
        }
        Adoption::Adopted(generation) => {
            if let Some(session) = session {
                resolve_profile(context, &session, generation).await;
            }
            settle_ready(context, epoch);
        }
    }
}

fn fail(context: &AuthContext, epoch: u64, err: &GatewayError) {
    let phase = BootstrapPhase::Failed {
        message: CONNECTION_FAILED_MESSAGE.to_string(),
    };
    if context.settle(epoch, phase) {
        error!(epoch, error = %err, "bootstrap failed");
    } else {
        warn!(epoch, error = %err, "ignoring late bootstrap failure");
    }
}

fn settle_ready(context: &AuthContext, epoch: u64) {
    if context.settle(epoch, BootstrapPhase::Ready) {
        let snapshot = context.snapshot();
        info!(
            epoch,
            signed_in = snapshot.is_signed_in(),
            elevated = snapshot.is_elevated(),
            "bootstrap ready"
        );
    }
}

/// Apply a session-change notification.
///
/// The session is replaced immediately. Profile resolution for a new session
/// runs on its own task; the caller aborts it when a newer change arrives.
pub(crate) fn apply_session_change(
    context: &AuthContext,
    change: SessionChange,
) -> Option<JoinHandle<()>> {
    let generation = context.apply_session(change.session.clone());
    match change.session {
        Some(session) => {
            debug!(generation, user_id = %session.user_id(), "session changed");
            let context = context.clone();
            Some(tokio::spawn(async move {
                resolve_profile(&context, &session, generation).await;
            }))
        }
        None => {
            debug!(generation, "signed out");
            None
        }
    }
}

/// Find or create the profile for `session` and adopt it.
///
/// Always re-reads the row, so a token refresh picks up permission changes
/// made elsewhere. Resolutions are serialized; one whose generation has been
/// replaced by the time it runs or finishes leaves the snapshot untouched.
/// Lookup and insert failures are logged and leave the held profile as is.
pub(crate) async fn resolve_profile(context: &AuthContext, session: &Session, generation: u64) {
    let _guard = context.resolve_lock().lock().await;

    if context.current_generation() != generation {
        debug!(generation, "skipping profile resolution for replaced session");
        return;
    }
    let user_id = session.user_id();

    let gateway = context.gateway();
    let profile = match gateway.find_profile(user_id).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            let new = NewProfile::default_for(user_id.clone(), session.user.email_or_empty());
            match gateway.insert_profile(new).await {
                Ok(profile) => {
                    info!(user_id = %user_id, name = %profile.name, "created profile");
                    Some(profile)
                }
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "failed to create profile");
                    None
                }
            }
        }
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "failed to look up profile");
            None
        }
    };

    if let Some(profile) = profile {
        if !context.adopt_profile(generation, profile) {
            debug!(generation, "discarding profile for replaced session");
        }
    }
}

//! Admin Workflow - Portable Business Logic
//!
//! Permission management for elevated members: list every profile and flip
//! the elevated flag on one of them.

use crate::authorization::require_admin;
use crate::core::AuthContext;
use crate::errors::{AppError, GatewayError};
use crate::gateway::UserId;
use crate::views::{AdminPanelState, ProfileUpdate};
use tracing::{info, warn};

/// Load the permission panel.
///
/// **What it does**: Fetches all profiles, ordered by name
/// **Returns**: Fresh panel state with an empty search
///
/// Authorization: elevated members only.
pub async fn load_panel(context: &AuthContext) -> Result<AdminPanelState, AppError> {
    require_admin(&context.snapshot(), "Managing permissions")?;

    let profiles = context.gateway().list_profiles().await.map_err(|err| {
        warn!(error = %err, "failed to load profiles");
        AppError::from(err)
    })?;
    Ok(AdminPanelState::new(profiles))
}

/// Flip the elevated flag of `target`.
///
/// **What it does**: Writes the inverted flag through the gateway
/// **Returns**: The new flag value
/// **Signal pattern**: When `target` is the caller, the held profile is
/// replaced so navigation follows immediately
///
/// Authorization: elevated members only. The backend may still refuse with
/// `PermissionDenied`, which maps to [`AuthFailure::InsufficientPermissions`].
///
/// [`AuthFailure::InsufficientPermissions`]: crate::errors::AuthFailure::InsufficientPermissions
pub async fn toggle_elevated(
    context: &AuthContext,
    panel: &mut AdminPanelState,
    target: &UserId,
) -> Result<bool, AppError> {
    require_admin(&context.snapshot(), "Changing permissions")?;

    let current = panel
        .find(target)
        .ok_or_else(|| AppError::from(GatewayError::not_found(format!("profile {target}"))))?
        .elevated;
    if panel.updating.is_some() {
        return Err(AppError::user_action(
            "Update already in progress",
            "Wait for the current change to finish",
        ));
    }

    let elevated = !current;
    panel.updating = Some(target.clone());
    let result = context
        .gateway()
        .update_profile(target, ProfileUpdate::elevated(elevated))
        .await;
    panel.updating = None;

    if let Err(err) = result {
        warn!(target = %target, error = %err, "failed to update permissions");
        return Err(err.into());
    }

    panel.set_elevated(target, elevated);
    if let Some(profile) = panel.find(target).cloned() {
        if context.refresh_own_profile(profile) {
            info!(elevated, "own permissions changed");
        }
    }
    info!(target = %target, elevated, "permissions updated");
    Ok(elevated)
}

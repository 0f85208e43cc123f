//! Auth Workflow - Sign In, Sign Up, Sign Out
//!
//! Validates the sign-in form before calling the gateway. Successful sign-in
//! and sign-out reach the [`AuthContext`] through the gateway's session-change
//! notification, so these functions never write the snapshot themselves.

use crate::core::AuthContext;
use crate::errors::AppError;
use crate::gateway::{Credentials, Session};
use tracing::{info, warn};

/// Minimum password length accepted by the identity service.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum display-name length accepted at sign-up.
pub const MAX_FULL_NAME_LENGTH: usize = 80;

/// Outcome of a sign-up request, for the form to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpResult {
    /// Account created; the user must confirm their email before signing in
    ConfirmEmail,
    /// Account created; the user can sign in now
    SignInNow,
}

impl SignUpResult {
    /// Message to show after a successful sign-up.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ConfirmEmail => "Registration complete! Check your email to confirm your account.",
            Self::SignInNow => "Registration complete! You can sign in now.",
        }
    }
}

/// Validate an email address enough to catch typos.
pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::user_action(
            "Email is required",
            "Enter the email you signed up with",
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AppError::user_action(
            "Invalid email address",
            "Use the form name@example.org",
        ));
    }
    Ok(email.to_string())
}

/// Validate a password for sign-up.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::user_action(
            "Password too short",
            format!("Use at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Validate the full name entered at sign-up.
pub fn validate_full_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::user_action("Name is required", "Enter your name"));
    }
    if name.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(AppError::user_action(
            "Name too long",
            format!("Use at most {MAX_FULL_NAME_LENGTH} characters"),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::user_action(
            "Name contains invalid characters",
            "Remove control characters",
        ));
    }
    Ok(name.to_string())
}

/// Sign in with email and password.
pub async fn sign_in(
    context: &AuthContext,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(AppError::user_action("Password is required", "Enter your password"));
    }

    let session = context
        .gateway()
        .sign_in_with_password(&Credentials::new(email, password))
        .await
        .map_err(|err| {
            warn!(error = %err, "sign-in failed");
            AppError::from(err)
        })?;
    info!(user_id = %session.user_id(), "signed in");
    Ok(session)
}

/// Register a new account.
pub async fn sign_up(
    context: &AuthContext,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<SignUpResult, AppError> {
    let full_name = validate_full_name(full_name)?;
    let email = validate_email(email)?;
    validate_password(password)?;

    let outcome = context
        .gateway()
        .sign_up(&Credentials::new(email, password), &full_name)
        .await
        .map_err(|err| {
            warn!(error = %err, "sign-up failed");
            AppError::from(err)
        })?;
    info!(confirmation_required = outcome.confirmation_required, "signed up");
    Ok(if outcome.confirmation_required {
        SignUpResult::ConfirmEmail
    } else {
        SignUpResult::SignInNow
    })
}

/// End the current session.
pub async fn sign_out(context: &AuthContext) -> Result<(), AppError> {
    context.gateway().sign_out().await?;
    info!("signed out");
    Ok(())
}

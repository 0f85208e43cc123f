//! Categorized application errors
//!
//! Provides structured error types that enable:
//! - Tagged gateway failures (not found vs transport vs permission) without
//!   inspecting human-readable messages
//! - Categorized error handling (network vs auth vs user action)
//! - Appropriate toast severity routing
//! - Recovery hints for user-actionable errors

use std::fmt;

pub use crate::views::notifications::ToastLevel;

// ============================================================================
// Gateway Errors
// ============================================================================

/// Failure reported by the backend gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The requested row or session does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The backend could not be reached or answered with a service failure
    #[error("transport failure ({code}): {message}")]
    Transport {
        code: NetworkErrorCode,
        message: String,
    },

    /// The backend refused an operation the caller is not allowed to perform
    #[error("permission denied: {operation}")]
    PermissionDenied { operation: String },

    /// The identity service rejected the supplied credentials
    #[error("request rejected: {reason}")]
    Rejected { reason: String },

    /// A write collided with an existing row
    #[error("{resource} already exists")]
    Conflict { resource: String },
}

impl GatewayError {
    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a transport error
    pub fn transport(code: NetworkErrorCode, message: impl Into<String>) -> Self {
        Self::Transport {
            code,
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission_denied(operation: impl Into<String>) -> Self {
        Self::PermissionDenied {
            operation: operation.into(),
        }
    }

    /// Create a credential rejection
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create a uniqueness conflict
    pub fn conflict(resource: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
        }
    }

    /// Whether this is the expected "nothing there" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Category for frontend handling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Transport { .. } => ErrorCategory::Network,
            Self::PermissionDenied { .. } => ErrorCategory::Capability,
            Self::Rejected { .. } => ErrorCategory::Input,
            Self::Conflict { .. } => ErrorCategory::Operation,
        }
    }
}

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Authorization errors (require elevated access)
    Capability,
    /// Resource not found errors
    NotFound,
    /// Network connectivity errors (often transient)
    Network,
    /// General operation failures (catch-all)
    Operation,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input)
    }

    /// Check if this error category is likely transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::NotFound)
    }

    /// Get the appropriate toast severity for this category.
    #[must_use]
    pub fn toast_severity(&self) -> ToastLevel {
        match self {
            Self::Input => ToastLevel::Info,
            Self::Capability => ToastLevel::Error,
            Self::NotFound => ToastLevel::Warning,
            Self::Network => ToastLevel::Warning,
            Self::Operation => ToastLevel::Error,
        }
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Capability => "Permission",
            Self::NotFound => "Not Found",
            Self::Network => "Network",
            Self::Operation => "Operation",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Capability => "This action requires administrator access",
            Self::NotFound => "The requested record could not be found",
            Self::Network => "Check your network connection and retry",
            Self::Operation => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Network error codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkErrorCode {
    /// Connection timeout
    Timeout,
    /// The hosted service is paused or under maintenance
    ServiceUnavailable,
    /// Generic network error
    Other,
}

impl fmt::Display for NetworkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ServiceUnavailable => write!(f, "service unavailable"),
            Self::Other => write!(f, "network error"),
        }
    }
}

/// Authentication/authorization failure reasons
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// Invalid credentials
    InvalidCredentials,
    /// Operation requires a signed-in session
    NotSignedIn,
    /// Insufficient permissions
    InsufficientPermissions,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::NotSignedIn => write!(f, "not signed in"),
            Self::InsufficientPermissions => write!(f, "insufficient permissions"),
        }
    }
}

// ============================================================================
// Application Errors
// ============================================================================

/// Categorized application errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppError {
    /// Network-related failures
    Network {
        code: NetworkErrorCode,
        message: String,
        recoverable: bool,
    },
    /// Authentication/authorization failures
    Auth {
        reason: AuthFailure,
        context: String,
    },
    /// A record the operation needed does not exist
    NotFound { resource: String },
    /// User action failures (with recovery hint)
    UserAction { action: String, hint: String },
    /// Internal errors (unexpected conditions)
    Internal { source: String, message: String },
}

impl AppError {
    /// Create a network error
    pub fn network(code: NetworkErrorCode, message: impl Into<String>) -> Self {
        Self::Network {
            code,
            message: message.into(),
            recoverable: true,
        }
    }

    /// Create an auth error
    pub fn auth(reason: AuthFailure, context: impl Into<String>) -> Self {
        Self::Auth {
            reason,
            context: context.into(),
        }
    }

    /// Create a permission error for an elevated-only operation
    pub fn permission_denied(operation: impl Into<String>) -> Self {
        Self::auth(AuthFailure::InsufficientPermissions, operation)
    }

    /// Create a user action error with recovery hint
    pub fn user_action(action: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::UserAction {
            action: action.into(),
            hint: hint.into(),
        }
    }

    /// Create an internal error
    pub fn internal(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Get the category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::Auth { reason, .. } => match reason {
                AuthFailure::InvalidCredentials => ErrorCategory::Input,
                AuthFailure::NotSignedIn | AuthFailure::InsufficientPermissions => {
                    ErrorCategory::Capability
                }
            },
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::UserAction { .. } => ErrorCategory::Input,
            Self::Internal { .. } => ErrorCategory::Operation,
        }
    }

    /// Get the appropriate toast severity for this error
    pub fn toast_level(&self) -> ToastLevel {
        match self {
            Self::Network { recoverable, .. } => {
                if *recoverable {
                    ToastLevel::Warning
                } else {
                    ToastLevel::Error
                }
            }
            Self::Auth { .. } => ToastLevel::Error,
            Self::NotFound { .. } => ToastLevel::Warning,
            Self::UserAction { .. } => ToastLevel::Info,
            Self::Internal { .. } => ToastLevel::Error,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network { recoverable, .. } => *recoverable,
            Self::Auth { reason, .. } => matches!(reason, AuthFailure::InvalidCredentials),
            Self::NotFound { .. } => true,
            Self::UserAction { .. } => true,
            Self::Internal { .. } => false,
        }
    }

    /// Get a short error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network { code, .. } => match code {
                NetworkErrorCode::Timeout => "NET_TIMEOUT",
                NetworkErrorCode::ServiceUnavailable => "NET_UNAVAILABLE",
                NetworkErrorCode::Other => "NET_ERROR",
            },
            Self::Auth { reason, .. } => match reason {
                AuthFailure::InvalidCredentials => "AUTH_INVALID",
                AuthFailure::NotSignedIn => "AUTH_SIGNED_OUT",
                AuthFailure::InsufficientPermissions => "AUTH_PERMISSION",
            },
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UserAction { .. } => "USER_ACTION",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { code, message, .. } => {
                write!(f, "Network error ({code}): {message}")
            }
            Self::Auth { reason, context } => {
                write!(f, "Authentication failed ({reason}): {context}")
            }
            Self::NotFound { resource } => write!(f, "Not found: {resource}"),
            Self::UserAction { action, hint } => {
                write!(f, "{action} - {hint}")
            }
            Self::Internal { source, message } => {
                write!(f, "{source}: {message}")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { resource } => Self::NotFound { resource },
            GatewayError::Transport { code, message } => Self::network(code, message),
            GatewayError::PermissionDenied { operation } => Self::permission_denied(operation),
            GatewayError::Rejected { reason } => {
                Self::auth(AuthFailure::InvalidCredentials, reason)
            }
            GatewayError::Conflict { resource } => {
                Self::internal("gateway", format!("{resource} already exists"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let err = AppError::network(NetworkErrorCode::Timeout, "request timed out after 10s");
        assert_eq!(
            err.to_string(),
            "Network error (timeout): request timed out after 10s"
        );
        assert_eq!(err.code(), "NET_TIMEOUT");
        assert!(err.is_recoverable());
        assert_eq!(err.toast_level(), ToastLevel::Warning);
    }

    #[test]
    fn test_permission_error() {
        let err = AppError::permission_denied("toggle admin access");
        assert_eq!(
            err.to_string(),
            "Authentication failed (insufficient permissions): toggle admin access"
        );
        assert_eq!(err.code(), "AUTH_PERMISSION");
        assert_eq!(err.category(), ErrorCategory::Capability);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_action_error() {
        let err = AppError::user_action("Email is required", "Enter the email you signed up with");
        assert_eq!(
            err.to_string(),
            "Email is required - Enter the email you signed up with"
        );
        assert_eq!(err.code(), "USER_ACTION");
        assert_eq!(err.toast_level(), ToastLevel::Info);
    }

    #[test]
    fn test_gateway_error_conversion() {
        let err: AppError =
            GatewayError::transport(NetworkErrorCode::ServiceUnavailable, "paused").into();
        assert_eq!(err.code(), "NET_UNAVAILABLE");

        let err: AppError = GatewayError::permission_denied("update profile").into();
        assert_eq!(err.category(), ErrorCategory::Capability);

        let err: AppError = GatewayError::rejected("Invalid login credentials").into();
        assert_eq!(err.code(), "AUTH_INVALID");
        assert_eq!(err.category(), ErrorCategory::Input);

        let err: AppError = GatewayError::not_found("profile").into();
        assert_eq!(
            err,
            AppError::NotFound {
                resource: "profile".into()
            }
        );

        let err: AppError = GatewayError::conflict("profile u-1").into();
        assert_eq!(err.code(), "INTERNAL");
        assert_eq!(err.category(), ErrorCategory::Operation);
        assert_eq!(err.toast_level(), ToastLevel::Error);
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "gateway: profile u-1 already exists");
    }

    #[test]
    fn test_gateway_error_categories() {
        assert!(GatewayError::not_found("session").is_not_found());
        assert!(!GatewayError::rejected("bad password").is_not_found());
        assert_eq!(
            GatewayError::transport(NetworkErrorCode::Other, "x").category(),
            ErrorCategory::Network
        );
        assert_eq!(
            GatewayError::transport(NetworkErrorCode::Timeout, "slow").to_string(),
            "transport failure (timeout): slow"
        );
    }

    #[test]
    fn test_error_category_classification() {
        assert!(ErrorCategory::Input.is_user_correctable());
        assert!(!ErrorCategory::Network.is_user_correctable());
        assert!(ErrorCategory::Network.is_transient());
        assert!(ErrorCategory::NotFound.is_transient());
        assert!(!ErrorCategory::Capability.is_transient());
        assert_eq!(ErrorCategory::Capability.to_string(), "Permission");
        for category in [
            ErrorCategory::Input,
            ErrorCategory::Capability,
            ErrorCategory::NotFound,
            ErrorCategory::Network,
            ErrorCategory::Operation,
        ] {
            assert!(!category.resolution_hint().is_empty());
        }
    }
}

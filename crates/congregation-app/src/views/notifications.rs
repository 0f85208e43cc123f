//! # Notification View State

use serde::{Deserialize, Serialize};

/// Toast severity used when surfacing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToastLevel {
    /// Informational message
    #[default]
    Info,
    /// Something needs attention but nothing failed permanently
    Warning,
    /// Operation failed
    Error,
}

impl ToastLevel {
    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, ErrorCategory, GatewayError, NetworkErrorCode};

    #[test]
    fn test_error_toasts_follow_category() {
        let offline: AppError =
            GatewayError::transport(NetworkErrorCode::ServiceUnavailable, "paused").into();
        assert_eq!(offline.toast_level(), ToastLevel::Warning);
        assert_eq!(offline.toast_level().label(), "warning");
        assert_eq!(ErrorCategory::Capability.toast_severity(), ToastLevel::Error);
        assert_eq!(ToastLevel::default(), ToastLevel::Info);
    }
}

//! # Bootstrap View State
//!
//! The `(Session, Profile, phase)` triple published by the auth context and
//! consumed by the navigation shell.

use crate::gateway::Session;
use crate::views::profile::Profile;
use serde::{Deserialize, Serialize};

/// Progress of the startup sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BootstrapPhase {
    /// Waiting for the backend
    #[default]
    Loading,
    /// Still waiting, past the slow-connection threshold
    Slow,
    /// Gave up waiting; proceeds with whatever is held and offers a retry
    TimedOut,
    /// The backend could not be reached
    Failed {
        /// User-facing explanation
        message: String,
    },
    /// Session (or its absence) established
    Ready,
}

impl BootstrapPhase {
    /// Whether the startup sequence has reached a terminal phase.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed { .. } | Self::Ready)
    }

    /// Whether the UI should show the slow-connection indicator.
    pub fn is_slow(&self) -> bool {
        matches!(self, Self::Slow)
    }

    /// Whether the UI should offer a manual retry.
    pub fn offers_retry(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Failed { .. })
    }

    /// Short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Slow => "slow",
            Self::TimedOut => "timed-out",
            Self::Failed { .. } => "error",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed { message } => write!(f, "error: {message}"),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// Startup progress
    pub phase: BootstrapPhase,
    /// Current session, if signed in
    pub session: Option<Session>,
    /// Resolved profile for the session identity
    pub profile: Option<Profile>,
}

impl AuthSnapshot {
    /// Whether a session is held.
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the held profile carries the elevated flag.
    pub fn is_elevated(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.elevated)
    }

    /// Loading-screen message matching the current phase, if still loading.
    pub fn loading_message(&self) -> Option<&'static str> {
        match self.phase {
            BootstrapPhase::Loading => Some("Connecting to your community..."),
            BootstrapPhase::Slow => Some("The server is waking up, please wait..."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_phases() {
        assert!(!BootstrapPhase::Loading.is_settled());
        assert!(!BootstrapPhase::Slow.is_settled());
        assert!(BootstrapPhase::TimedOut.is_settled());
        assert!(BootstrapPhase::Ready.is_settled());
        assert!(BootstrapPhase::Failed {
            message: "down".into()
        }
        .is_settled());
    }

    #[test]
    fn test_retry_affordance() {
        assert!(BootstrapPhase::TimedOut.offers_retry());
        assert!(!BootstrapPhase::Ready.offers_retry());
        assert!(!BootstrapPhase::Slow.offers_retry());
    }

    #[test]
    fn test_loading_message_tracks_phase() {
        let mut snapshot = AuthSnapshot::default();
        assert_eq!(
            snapshot.loading_message(),
            Some("Connecting to your community...")
        );
        snapshot.phase = BootstrapPhase::Slow;
        assert!(snapshot.loading_message().is_some_and(|m| m.contains("waking up")));
        snapshot.phase = BootstrapPhase::Ready;
        assert_eq!(snapshot.loading_message(), None);
    }

    #[test]
    fn test_phase_display() {
        let failed = BootstrapPhase::Failed {
            message: "offline".into(),
        };
        assert_eq!(failed.to_string(), "error: offline");
        assert_eq!(BootstrapPhase::TimedOut.to_string(), "timed-out");
    }
}

//! # Profile View State
//!
//! Application-level record extending a session identity with a display name
//! and the elevated-access flag.

use crate::gateway::UserId;
use serde::{Deserialize, Serialize};

/// Display name used when nothing usable can be derived from an email.
pub const DEFAULT_DISPLAY_NAME: &str = "Member";

/// A member profile, one per authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    /// Identity of the owning user
    pub id: UserId,
    /// Contact email
    pub email: String,
    /// Display name
    pub name: String,
    /// Whether the profile grants access to the admin panel
    pub elevated: bool,
}

impl Profile {
    /// Check whether a search term matches this profile's name or email.
    ///
    /// Matching is case-insensitive; an empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term) || self.email.to_lowercase().contains(&term)
    }
}

/// Insert payload for a profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    /// Identity the profile belongs to
    pub id: UserId,
    /// Contact email
    pub email: String,
    /// Display name
    pub name: String,
    /// Elevated-access flag
    pub elevated: bool,
}

impl NewProfile {
    /// The default profile created the first time an identity is seen.
    ///
    /// Never elevated; the name is derived from the email's local part.
    pub fn default_for(id: UserId, email: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: derive_display_name(email),
            elevated: false,
        }
    }

    /// Materialize the row as the backend would return it.
    pub fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            email: self.email,
            name: self.name,
            elevated: self.elevated,
        }
    }
}

/// Partial update payload for a profile row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New elevated-access flag
    pub elevated: Option<bool>,
}

impl ProfileUpdate {
    /// Update that only sets the elevated flag.
    pub fn elevated(value: bool) -> Self {
        Self {
            name: None,
            elevated: Some(value),
        }
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.elevated.is_none()
    }

    /// Apply the update to an existing profile.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name.clone_from(name);
        }
        if let Some(elevated) = self.elevated {
            profile.elevated = elevated;
        }
    }
}

/// Derive a display name from an email address.
///
/// Takes the part before the first `@`, as is. An address without `@` yields
/// the trimmed input, or [`DEFAULT_DISPLAY_NAME`] when that is empty.
///
/// ```rust
/// use congregation_app::views::profile::derive_display_name;
///
/// assert_eq!(derive_display_name("maria@example.org"), "maria");
/// assert_eq!(derive_display_name("no-at-sign"), "no-at-sign");
/// assert_eq!(derive_display_name(""), "Member");
/// ```
pub fn derive_display_name(email: &str) -> String {
    if let Some((local, _)) = email.split_once('@') {
        return local.to_string();
    }
    let raw = email.trim();
    if raw.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        raw.to_string()
    }
}

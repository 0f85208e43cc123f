//! # Admin Panel View State

use crate::gateway::UserId;
use crate::views::profile::Profile;
use serde::{Deserialize, Serialize};

/// State of the admin permission panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPanelState {
    /// All profiles, ordered by name
    pub profiles: Vec<Profile>,
    /// Current search term
    pub search: String,
    /// Profile whose elevated flag is being changed
    pub updating: Option<UserId>,
}

impl AdminPanelState {
    /// Create panel state from a freshly loaded profile list.
    pub fn new(mut profiles: Vec<Profile>) -> Self {
        sort_by_name(&mut profiles);
        Self {
            profiles,
            search: String::new(),
            updating: None,
        }
    }

    /// Profiles matching the current search term.
    pub fn visible(&self) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|p| p.matches(&self.search))
            .collect()
    }

    /// Message to show when the search matches nothing.
    pub fn empty_message(&self) -> Option<String> {
        if self.visible().is_empty() {
            Some(format!("No users found for \"{}\".", self.search))
        } else {
            None
        }
    }

    /// Whether the row for `id` has an update in flight.
    pub fn is_updating(&self, id: &UserId) -> bool {
        self.updating.as_ref() == Some(id)
    }

    /// Look up a profile by identity.
    pub fn find(&self, id: &UserId) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    /// Record a confirmed elevated-flag change.
    pub fn set_elevated(&mut self, id: &UserId, elevated: bool) {
        if let Some(profile) = self.profiles.iter_mut().find(|p| &p.id == id) {
            profile.elevated = elevated;
        }
    }

    /// Number of elevated profiles.
    pub fn elevated_count(&self) -> usize {
        self.profiles.iter().filter(|p| p.elevated).count()
    }
}

fn sort_by_name(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, elevated: bool) -> Profile {
        Profile {
            id: UserId::new(id),
            email: format!("{id}@example.org"),
            name: name.to_string(),
            elevated,
        }
    }

    #[test]
    fn test_panel_orders_by_name() {
        let panel = AdminPanelState::new(vec![
            profile("b", "zilda", false),
            profile("a", "Ana", true),
            profile("c", "marcos", false),
        ]);
        let names: Vec<_> = panel.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "marcos", "zilda"]);
        assert_eq!(panel.elevated_count(), 1);
    }

    #[test]
    fn test_search_filters_and_reports_empty() {
        let mut panel =
            AdminPanelState::new(vec![profile("a", "Ana", true), profile("b", "Bruno", false)]);
        panel.search = "bru".into();
        assert_eq!(panel.visible().len(), 1);
        assert!(panel.empty_message().is_none());

        panel.search = "xyz".into();
        assert!(panel.visible().is_empty());
        assert_eq!(
            panel.empty_message().as_deref(),
            Some("No users found for \"xyz\".")
        );
    }

    #[test]
    fn test_set_elevated_updates_row() {
        let mut panel = AdminPanelState::new(vec![profile("a", "Ana", false)]);
        panel.set_elevated(&UserId::new("a"), true);
        assert!(panel.find(&UserId::new("a")).is_some_and(|p| p.elevated));
        panel.set_elevated(&UserId::new("missing"), true);
        assert_eq!(panel.elevated_count(), 1);
    }
}

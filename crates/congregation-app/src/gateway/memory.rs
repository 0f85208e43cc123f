//! In-process [`Gateway`] implementation.
//!
//! Holds accounts, the current session and profile rows in memory and
//! delivers session-change notifications to subscribers. Faults and latency
//! can be injected per operation so tests and the host binary can reproduce
//! a sleeping or unreachable backend.

use super::{
    AuthUser, Credentials, Gateway, Session, SessionChange, SessionSubscription, SignUpOutcome,
    UserId,
};
use crate::errors::{GatewayError, NetworkErrorCode};
use crate::views::profile::{NewProfile, Profile, ProfileUpdate};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: Vec<(u64, mpsc::UnboundedSender<SessionChange>)>,
}

#[derive(Debug, Default, Clone)]
struct Faults {
    session: Option<GatewayError>,
    find_profile: Option<GatewayError>,
    insert_profile: Option<GatewayError>,
    update_profile: Option<GatewayError>,
    list_profiles: Option<GatewayError>,
    session_latency: Option<Duration>,
    profile_latency: Option<Duration>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    current: Option<Session>,
    profiles: BTreeMap<UserId, Profile>,
    faults: Faults,
}

/// In-memory gateway with fault injection.
pub struct MemoryGateway {
    state: Mutex<State>,
    subscribers: Arc<Mutex<Subscribers>>,
    confirm_sign_ups: bool,
    enforce_elevated_updates: bool,
    insert_calls: AtomicUsize,
    find_calls: AtomicUsize,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Empty backend: no accounts, no session, no profiles.
    ///
    /// Profile updates require the caller's own profile to be elevated.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            confirm_sign_ups: false,
            enforce_elevated_updates: true,
            insert_calls: AtomicUsize::new(0),
            find_calls: AtomicUsize::new(0),
        }
    }

    /// Require email confirmation after sign-up.
    pub fn with_email_confirmation(mut self) -> Self {
        self.confirm_sign_ups = true;
        self
    }

    /// Allow any signed-in caller to update any profile.
    pub fn without_update_checks(mut self) -> Self {
        self.enforce_elevated_updates = false;
        self
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Register an account and return its identity.
    pub fn register_account(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> UserId {
        let id = UserId::generate();
        let account = Account {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
                full_name: full_name.map(str::to_string),
            },
            password: password.to_string(),
        };
        self.state
            .lock()
            .accounts
            .insert(email.to_lowercase(), account);
        id
    }

    /// Insert or replace a profile row directly.
    pub fn put_profile(&self, profile: Profile) {
        self.state
            .lock()
            .profiles
            .insert(profile.id.clone(), profile);
    }

    /// Build a session for a registered account without signing in.
    pub fn session_for(&self, id: &UserId) -> Option<Session> {
        let state = self.state.lock();
        state
            .accounts
            .values()
            .find(|a| &a.user.id == id)
            .map(|a| new_session(a.user.clone()))
    }

    /// Set the current session silently, as if restored from storage.
    pub fn restore_session(&self, session: Option<Session>) {
        self.state.lock().current = session;
    }

    /// Set the current session and notify subscribers.
    pub fn emit_session(&self, session: Option<Session>) {
        self.state.lock().current.clone_from(&session);
        self.notify(SessionChange { session });
    }

    // =========================================================================
    // Fault Injection
    // =========================================================================

    /// Make `current_session` fail with `error` (or succeed again with `None`).
    pub fn fail_session_fetch(&self, error: Option<GatewayError>) {
        self.state.lock().faults.session = error;
    }

    /// Make `find_profile` fail.
    pub fn fail_profile_lookup(&self, error: Option<GatewayError>) {
        self.state.lock().faults.find_profile = error;
    }

    /// Make `insert_profile` fail.
    pub fn fail_profile_insert(&self, error: Option<GatewayError>) {
        self.state.lock().faults.insert_profile = error;
    }

    /// Make `update_profile` fail.
    pub fn fail_profile_update(&self, error: Option<GatewayError>) {
        self.state.lock().faults.update_profile = error;
    }

    /// Make `list_profiles` fail.
    pub fn fail_profile_list(&self, error: Option<GatewayError>) {
        self.state.lock().faults.list_profiles = error;
    }

    /// Delay every `current_session` call.
    pub fn set_session_latency(&self, latency: Option<Duration>) {
        self.state.lock().faults.session_latency = latency;
    }

    /// Delay every profile lookup and insert.
    pub fn set_profile_latency(&self, latency: Option<Duration>) {
        self.state.lock().faults.profile_latency = latency;
    }

    /// Shorthand for an unreachable backend.
    pub fn go_offline(&self) {
        self.fail_session_fetch(Some(GatewayError::transport(
            NetworkErrorCode::ServiceUnavailable,
            "the database is paused or under maintenance",
        )));
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Number of live session-change subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().senders.len()
    }

    /// Number of stored profile rows.
    pub fn profile_count(&self) -> usize {
        self.state.lock().profiles.len()
    }

    /// Stored profile row for `id`.
    pub fn profile(&self, id: &UserId) -> Option<Profile> {
        self.state.lock().profiles.get(id).cloned()
    }

    /// Number of `insert_profile` calls, successful or not.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_profile` calls, successful or not.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    fn notify(&self, change: SessionChange) {
        let mut subscribers = self.subscribers.lock();
        subscribers
            .senders
            .retain(|(_, sender)| sender.send(change.clone()).is_ok());
    }

    fn caller_is_elevated(state: &State) -> bool {
        state
            .current
            .as_ref()
            .and_then(|s| state.profiles.get(s.user_id()))
            .is_some_and(|p| p.elevated)
    }
}

fn new_session(user: AuthUser) -> Session {
    Session {
        access_token: uuid::Uuid::new_v4().simple().to_string(),
        user,
    }
}

async fn delay(latency: Option<Duration>) {
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let latency = self.state.lock().faults.session_latency;
        delay(latency).await;

        let state = self.state.lock();
        if let Some(err) = state.faults.session.clone() {
            return Err(err);
        }
        Ok(state.current.clone())
    }

    fn subscribe_session_changes(&self) -> SessionSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut subscribers = self.subscribers.lock();
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.senders.push((id, tx));
            id
        };
        let subscribers = Arc::downgrade(&self.subscribers);
        SessionSubscription::new(rx, move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.lock().senders.retain(|(sid, _)| *sid != id);
            }
        })
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, GatewayError> {
        let session = {
            let mut state = self.state.lock();
            let account = state
                .accounts
                .get(&credentials.email.to_lowercase())
                .filter(|a| a.password == credentials.password)
                .cloned()
                .ok_or_else(|| GatewayError::rejected("Invalid login credentials"))?;
            let session = new_session(account.user);
            state.current = Some(session.clone());
            session
        };
        self.notify(SessionChange {
            session: Some(session.clone()),
        });
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        full_name: &str,
    ) -> Result<SignUpOutcome, GatewayError> {
        let exists = self
            .state
            .lock()
            .accounts
            .contains_key(&credentials.email.to_lowercase());
        if exists {
            return Err(GatewayError::rejected("User already registered"));
        }
        self.register_account(&credentials.email, &credentials.password, Some(full_name));
        Ok(SignUpOutcome {
            confirmation_required: self.confirm_sign_ups,
        })
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.emit_session(None);
        Ok(())
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<Profile>, GatewayError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.state.lock().faults.profile_latency;
        delay(latency).await;

        let state = self.state.lock();
        if let Some(err) = state.faults.find_profile.clone() {
            return Err(err);
        }
        Ok(state.profiles.get(id).cloned())
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<Profile, GatewayError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.state.lock().faults.profile_latency;
        delay(latency).await;

        let mut state = self.state.lock();
        if let Some(err) = state.faults.insert_profile.clone() {
            return Err(err);
        }
        if state.profiles.contains_key(&profile.id) {
            return Err(GatewayError::conflict(format!("profile {}", profile.id)));
        }
        let stored = profile.into_profile();
        state.profiles.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        if let Some(err) = state.faults.update_profile.clone() {
            return Err(err);
        }
        if self.enforce_elevated_updates && !Self::caller_is_elevated(&state) {
            return Err(GatewayError::permission_denied("update profile"));
        }
        let profile = state
            .profiles
            .get_mut(id)
            .ok_or_else(|| GatewayError::not_found(format!("profile {id}")))?;
        update.apply_to(profile);
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, GatewayError> {
        let state = self.state.lock();
        if let Some(err) = state.faults.list_profiles.clone() {
            return Err(err);
        }
        let mut profiles: Vec<Profile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_notifies_subscribers() {
        let gateway = MemoryGateway::new();
        let id = gateway.register_account("ana@example.org", "pw", None);
        let mut subscription = gateway.subscribe_session_changes();

        let session = gateway
            .sign_in_with_password(&Credentials::new("ANA@example.org", "pw"))
            .await
            .unwrap();
        assert_eq!(session.user_id(), &id);

        let change = subscription.next_change().await.unwrap();
        assert_eq!(change.session.map(|s| s.user.id), Some(id));
        assert!(gateway.current_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_password() {
        let gateway = MemoryGateway::new();
        gateway.register_account("ana@example.org", "pw", None);
        let err = gateway
            .sign_in_with_password(&Credentials::new("ana@example.org", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches() {
        let gateway = MemoryGateway::new();
        let subscription = gateway.subscribe_session_changes();
        assert_eq!(gateway.subscriber_count(), 1);
        subscription.unsubscribe();
        assert_eq!(gateway.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let gateway = MemoryGateway::new();
        let id = UserId::new("u-1");
        gateway
            .insert_profile(NewProfile::default_for(id.clone(), "a@b.c"))
            .await
            .unwrap();
        let err = gateway
            .insert_profile(NewProfile::default_for(id, "a@b.c"))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::conflict("profile u-1"));
        assert_eq!(gateway.profile_count(), 1);
        assert_eq!(gateway.insert_calls(), 2);
    }

    #[tokio::test]
    async fn test_update_requires_elevated_caller() {
        let gateway = MemoryGateway::new();
        let id = gateway.register_account("ana@example.org", "pw", None);
        gateway.put_profile(NewProfile::default_for(id.clone(), "ana@example.org").into_profile());
        gateway.restore_session(gateway.session_for(&id));

        let err = gateway
            .update_profile(&id, ProfileUpdate::elevated(true))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::PermissionDenied { .. }));

        let open = MemoryGateway::new().without_update_checks();
        open.put_profile(NewProfile::default_for(id.clone(), "ana@example.org").into_profile());
        open.update_profile(&id, ProfileUpdate::elevated(true))
            .await
            .unwrap();
        assert!(open.profile(&id).is_some_and(|p| p.elevated));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_existing_account() {
        let gateway = MemoryGateway::new().with_email_confirmation();
        let creds = Credentials::new("new@example.org", "pw");
        let outcome = gateway.sign_up(&creds, "New Member").await.unwrap();
        assert!(outcome.confirmation_required);
        assert!(gateway.sign_up(&creds, "New Member").await.is_err());
    }
}

//! The auth context: owner of the session/profile snapshot.
//!
//! Constructed once with an injected gateway, started explicitly, disposed
//! explicitly. Every snapshot mutation goes through a synchronous
//! `Mutable::lock_mut` section so subscribers observe whole transitions.
//!
//! Two counters order concurrent work:
//! - the **epoch** identifies one bootstrap attempt; results of an attempt
//!   that has settled or been replaced are discarded
//! - the **generation** identifies the currently held session; a profile
//!   resolution for an older generation is discarded

use super::timers::BootstrapTimers;
use crate::config::AppConfig;
use crate::gateway::{BoxedGateway, Session, SessionSubscription};
use crate::navigation::NavState;
use crate::views::{AuthSnapshot, BootstrapPhase, Profile};
use crate::workflows::bootstrap;
use futures::StreamExt;
use futures_signals::signal::{Mutable, Signal, SignalExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of offering a fetched session to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Adoption {
    /// The attempt already settled or was replaced by a retry
    Stale,
    /// A session-change notification arrived first; its session wins
    Superseded,
    /// The session is now held under this generation
    Adopted(u64),
}

struct Listener {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub(crate) struct ContextInner {
    gateway: BoxedGateway,
    config: AppConfig,
    state: Mutable<AuthSnapshot>,
    epoch: AtomicU64,
    generation: AtomicU64,
    resolve_lock: async_lock::Mutex<()>,
    timers: Mutex<BootstrapTimers>,
    listener: Mutex<Option<Listener>>,
    disposed: AtomicBool,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            let _ = listener.shutdown.send(());
        }
        self.timers.get_mut().cancel();
    }
}

/// Long-lived authentication context shared by everything that routes.
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("snapshot", &self.snapshot())
            .field("epoch", &self.current_epoch())
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    /// Create a context in the `Loading` phase. Nothing runs until [`start`].
    ///
    /// [`start`]: AuthContext::start
    pub fn new(gateway: BoxedGateway, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                gateway,
                config,
                state: Mutable::new(AuthSnapshot::default()),
                epoch: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                resolve_lock: async_lock::Mutex::new(()),
                timers: Mutex::new(BootstrapTimers::default()),
                listener: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run the startup sequence until it settles.
    ///
    /// Subscribes to session changes on first call. Returns the snapshot as it
    /// stands when this attempt settles (or is superseded).
    pub async fn start(&self) -> AuthSnapshot {
        bootstrap::run(self).await;
        self.snapshot()
    }

    /// Manually restart the startup sequence from scratch.
    pub async fn retry(&self) -> AuthSnapshot {
        info!("retrying bootstrap");
        self.start().await
    }

    /// Stop timers and release the session-change subscription.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.timers.lock().cancel();
        let listener = self.inner.listener.lock().take();
        if let Some(listener) = listener {
            let _ = listener.shutdown.send(());
            if let Err(err) = listener.task.await {
                warn!(error = %err, "session listener ended abnormally");
            }
        }
        debug!("auth context disposed");
    }

    /// Whether [`dispose`](AuthContext::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.get_cloned()
    }

    /// Reactive snapshot signal.
    pub fn signal(&self) -> impl Signal<Item = AuthSnapshot> {
        self.inner.state.signal_cloned()
    }

    /// Current navigation state.
    pub fn nav_state(&self) -> NavState {
        NavState::from_snapshot(&self.inner.state.lock_ref())
    }

    /// Reactive navigation state signal.
    pub fn nav_signal(&self) -> impl Signal<Item = NavState> {
        self.inner.state.signal_ref(NavState::from_snapshot).dedupe()
    }

    /// Wait until the snapshot satisfies `predicate`.
    pub async fn wait_until<F>(&self, mut predicate: F) -> AuthSnapshot
    where
        F: FnMut(&AuthSnapshot) -> bool,
    {
        let stream = self.signal().to_stream();
        futures::pin_mut!(stream);
        while let Some(snapshot) = stream.next().await {
            if predicate(&snapshot) {
                return snapshot;
            }
        }
        self.snapshot()
    }

    /// Wait until the startup sequence has settled.
    pub async fn wait_settled(&self) -> AuthSnapshot {
        self.wait_until(|s| s.phase.is_settled()).await
    }

    /// Injected gateway.
    pub fn gateway(&self) -> &BoxedGateway {
        &self.inner.gateway
    }

    /// Active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    // =========================================================================
    // Transitions (crate-internal)
    // =========================================================================

    pub(crate) fn upgrade(weak: &Weak<ContextInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn downgrade(&self) -> Weak<ContextInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn current_epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    pub(crate) fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn timers_armed(&self) -> bool {
        self.inner.timers.lock().is_armed()
    }

    pub(crate) fn resolve_lock(&self) -> &async_lock::Mutex<()> {
        &self.inner.resolve_lock
    }

    /// Reset to `Loading`, open a new epoch and arm its timers.
    pub(crate) fn begin_attempt(&self) -> u64 {
        let epoch = {
            let mut state = self.inner.state.lock_mut();
            let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = AuthSnapshot::default();
            epoch
        };
        self.inner
            .timers
            .lock()
            .arm(self.downgrade(), epoch, &self.inner.config);
        debug!(epoch, "bootstrap attempt started");
        epoch
    }

    /// Subscribe to session changes once per context.
    pub(crate) fn ensure_listener(&self) {
        let mut listener = self.inner.listener.lock();
        if listener.is_some() {
            return;
        }
        let subscription = self.inner.gateway.subscribe_session_changes();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(listen(self.downgrade(), subscription, shutdown_rx));
        *listener = Some(Listener { shutdown, task });
        debug!("subscribed to session changes");
    }

    /// Flip `Loading` to `Slow` if `epoch` is still waiting.
    pub(crate) fn mark_slow(&self, epoch: u64) {
        let mut state = self.inner.state.lock_mut();
        if self.current_epoch() == epoch && state.phase == BootstrapPhase::Loading {
            debug!(epoch, "slow connection");
            state.phase = BootstrapPhase::Slow;
        }
    }

    /// Give up waiting on `epoch`, proceeding with whatever is held.
    pub(crate) fn give_up(&self, epoch: u64) {
        if self.settle(epoch, BootstrapPhase::TimedOut) {
            warn!(epoch, "bootstrap timed out; offering retry");
        }
    }

    /// Move `epoch` to a settled phase. Returns `false` when the attempt had
    /// already settled or been replaced.
    pub(crate) fn settle(&self, epoch: u64, phase: BootstrapPhase) -> bool {
        debug_assert!(phase.is_settled());
        let settled = {
            let mut state = self.inner.state.lock_mut();
            if self.current_epoch() != epoch || state.phase.is_settled() {
                false
            } else {
                state.phase = phase;
                true
            }
        };
        if settled {
            self.inner.timers.lock().cancel();
        }
        settled
    }

    /// Offer the session fetched by `epoch`'s bootstrap.
    ///
    /// `observed_generation` is the generation when the fetch began; if a
    /// session-change notification has been applied since, the fetched value
    /// is older than what is held and is dropped.
    pub(crate) fn adopt_fetched_session(
        &self,
        epoch: u64,
        observed_generation: u64,
        session: Option<Session>,
    ) -> Adoption {
        let mut state = self.inner.state.lock_mut();
        if self.current_epoch() != epoch || state.phase.is_settled() {
            return Adoption::Stale;
        }
        if self.current_generation() != observed_generation {
            return Adoption::Superseded;
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        replace_session(&mut state, session);
        Adoption::Adopted(generation)
    }

    /// Apply a session-change notification; returns its generation.
    pub(crate) fn apply_session(&self, session: Option<Session>) -> u64 {
        let mut state = self.inner.state.lock_mut();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        replace_session(&mut state, session);
        generation
    }

    /// Adopt a resolved profile if `generation` still names the held session.
    pub(crate) fn adopt_profile(&self, generation: u64, profile: Profile) -> bool {
        let mut state = self.inner.state.lock_mut();
        let current = self.current_generation() == generation
            && state
                .session
                .as_ref()
                .is_some_and(|s| s.user_id() == &profile.id);
        if current {
            state.profile = Some(profile);
        }
        current
    }

    /// Replace the held profile after an in-place edit of the caller's own row.
    pub(crate) fn refresh_own_profile(&self, profile: Profile) -> bool {
        let mut state = self.inner.state.lock_mut();
        let own = state
            .profile
            .as_ref()
            .is_some_and(|held| held.id == profile.id);
        if own {
            state.profile = Some(profile);
        }
        own
    }
}

fn replace_session(state: &mut AuthSnapshot, session: Option<Session>) {
    let same_identity = match (&state.profile, &session) {
        (Some(profile), Some(session)) => &profile.id == session.user_id(),
        _ => false,
    };
    if !same_identity {
        state.profile = None;
    }
    state.session = session;
}

async fn listen(
    context: Weak<ContextInner>,
    mut subscription: SessionSubscription,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut resolution: Option<JoinHandle<()>> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            change = subscription.next_change() => {
                let Some(change) = change else {
                    debug!("gateway closed the session-change channel");
                    break;
                };
                let Some(context) = AuthContext::upgrade(&context) else {
                    break;
                };
                // A newer change makes any in-flight resolution moot.
                if let Some(pending) = resolution.take() {
                    pending.abort();
                }
                resolution = bootstrap::apply_session_change(&context, change);
            }
        }
    }
    if let Some(pending) = resolution.take() {
        pending.abort();
    }
    subscription.unsubscribe();
    debug!("unsubscribed from session changes");
}

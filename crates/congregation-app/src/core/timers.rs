//! Cancellable side timers for the startup sequence.

use super::context::{AuthContext, ContextInner};
use crate::config::AppConfig;
use std::sync::Weak;
use tokio::task::JoinHandle;

/// The slow-connection and give-up timers of one bootstrap attempt.
///
/// Cancelling is idempotent: aborting a finished or already-aborted task is a
/// no-op.
#[derive(Default)]
pub(crate) struct BootstrapTimers {
    slow: Option<JoinHandle<()>>,
    give_up: Option<JoinHandle<()>>,
}

impl BootstrapTimers {
    /// Replace any running timers with fresh ones for `epoch`.
    pub(crate) fn arm(&mut self, context: Weak<ContextInner>, epoch: u64, config: &AppConfig) {
        self.cancel();

        let slow_after = config.slow_after();
        let weak = context.clone();
        self.slow = Some(tokio::spawn(async move {
            tokio::time::sleep(slow_after).await;
            if let Some(context) = AuthContext::upgrade(&weak) {
                context.mark_slow(epoch);
            }
        }));

        let give_up_after = config.give_up_after();
        self.give_up = Some(tokio::spawn(async move {
            tokio::time::sleep(give_up_after).await;
            if let Some(context) = AuthContext::upgrade(&context) {
                context.give_up(epoch);
            }
        }));
    }

    /// Abort both timers.
    pub(crate) fn cancel(&mut self) {
        for handle in [self.slow.take(), self.give_up.take()].into_iter().flatten() {
            handle.abort();
        }
    }

    /// Whether any timer is still pending.
    pub(crate) fn is_armed(&self) -> bool {
        [&self.slow, &self.give_up]
            .into_iter()
            .flatten()
            .any(|handle| !handle.is_finished())
    }
}

impl Drop for BootstrapTimers {
    fn drop(&mut self) {
        self.cancel();
    }
}

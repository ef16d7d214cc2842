//! Expiry monitor.
//!
//! Two independent periodic tasks run while a session is active: a forced
//! credential refresh every `refresh_interval`, and a recomputation of the
//! expiring-soon flag every `expiry_poll_interval`. Both hold only a weak
//! reference to the manager and stop when it is dropped or the monitor is
//! stopped.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use docadmin_core::config::SessionConfig;

use super::manager::{SessionInner, SessionManager};

/// Handle to the running monitor tasks.
pub(crate) struct ExpiryMonitor {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ExpiryMonitor {
    /// Spawn both tasks.
    pub(super) fn spawn(inner: Weak<SessionInner>, config: &SessionConfig) -> Self {
        let cancel = CancellationToken::new();
        let refresh = tokio::spawn(refresh_loop(
            inner.clone(),
            config.refresh_interval(),
            cancel.child_token(),
        ));
        let poll = tokio::spawn(expiry_loop(
            inner,
            config.expiry_poll_interval(),
            cancel.child_token(),
        ));
        debug!(
            refresh_secs = config.refresh_interval().as_secs(),
            poll_secs = config.expiry_poll_interval().as_secs(),
            "Expiry monitor started"
        );
        Self {
            cancel,
            tasks: vec![refresh, poll],
        }
    }

    /// Cancel both tasks.
    pub(super) fn stop(self) {
        drop(self);
    }
}

impl Drop for ExpiryMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in &self.tasks {
            task.abort();
        }
        debug!("Expiry monitor stopped");
    }
}

async fn refresh_loop(inner: Weak<SessionInner>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                let manager = SessionManager::from_inner(inner);
                if let Err(e) = manager.refresh(true).await {
                    warn!(error = %e, "Scheduled credential refresh failed");
                }
            }
        }
    }
}

async fn expiry_loop(inner: Weak<SessionInner>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                SessionManager::from_inner(inner).update_expiry_flag().await;
            }
        }
    }
}

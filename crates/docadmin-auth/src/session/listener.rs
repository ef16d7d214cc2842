//! Session-change listener.
//!
//! Follows the identity provider's session-change stream and the HTTP
//! client's event channel for the lifetime of the manager.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use docadmin_client::ClientEvent;

use super::manager::SessionManager;
use crate::provider::ProviderUser;

pub(super) fn spawn(
    manager: &SessionManager,
    mut changes: watch::Receiver<Option<ProviderUser>>,
    cancel: CancellationToken,
) {
    let weak = std::sync::Arc::downgrade(&manager.inner);
    let mut events = manager.inner.client.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        debug!("Identity provider stream closed");
                        break;
                    }
                    let user = changes.borrow_and_update().clone();
                    let Some(inner) = weak.upgrade() else { break };
                    SessionManager::from_inner(inner).on_provider_change(user).await;
                }
                event = events.recv() => match event {
                    Ok(ClientEvent::SessionExpired { token }) => {
                        let Some(inner) = weak.upgrade() else { break };
                        SessionManager::from_inner(inner).on_session_expired(token).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed client events");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("Session listener stopped");
    });
}

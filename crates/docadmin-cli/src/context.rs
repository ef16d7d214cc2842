//! Wiring shared by every command: persisted state, the API adapter, the
//! identity provider and the session manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use docadmin_auth::{FirebaseIdentityProvider, IdentityProvider, Session, SessionManager};
use docadmin_client::state::FileStore;
use docadmin_client::{ApiClient, AuditApi, Navigator};
use docadmin_core::config::AppConfig;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

use crate::output;

/// Path reported by commands that work on an existing session.
pub const CONSOLE_PATH: &str = "/console";

/// Navigator for a terminal session. There is no page to move away from,
/// so a redirect to the sign-in entry point becomes a hint on stderr.
///
/// Sign-in commands start at the configured sign-in path, which keeps
/// their own rejected requests from printing the hint.
#[derive(Debug)]
pub struct ConsoleNavigator {
    current: Mutex<String>,
    redirects: AtomicUsize,
}

impl ConsoleNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            redirects: AtomicUsize::new(0),
        }
    }

    /// Number of redirects requested so far.
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::Relaxed)
    }

    fn current(&self) -> std::sync::MutexGuard<'_, String> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConsoleNavigator {
    fn default() -> Self {
        Self::new(CONSOLE_PATH)
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.current().clone()
    }

    fn redirect(&self, target: &str) {
        debug!(target, "Redirect requested");
        self.redirects.fetch_add(1, Ordering::Relaxed);
        *self.current() = target.split('?').next().unwrap_or(target).to_string();
        if target.contains("session_expired") {
            output::print_warning("Your session has expired. Run `docadmin login` to sign in again.");
        }
    }
}

/// Everything a command needs to talk to the platform.
pub struct Console {
    pub config: AppConfig,
    pub client: ApiClient,
    pub session: SessionManager,
}

impl Console {
    /// Build the adapter and session manager, restoring a persisted session.
    ///
    /// `start_path` is where the navigator reports the console to be.
    pub async fn open(config: AppConfig, start_path: &str) -> AppResult<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.state.path));

        let provider = FirebaseIdentityProvider::new(&config.identity)?.with_store(store.clone());
        match provider.restore().await {
            Ok(restored) => debug!(restored, "Identity session restore attempted"),
            Err(e) => warn!(error = %e, "Could not restore identity session"),
        }

        let navigator = Arc::new(ConsoleNavigator::new(start_path));
        Self::assemble(config, store, Arc::new(provider), navigator).await
    }

    /// Wire the adapter, audit sink and session manager over the given parts.
    pub async fn assemble(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn IdentityProvider>,
        navigator: Arc<ConsoleNavigator>,
    ) -> AppResult<Self> {
        let client = ApiClient::new(&config.api, store, navigator)?;
        let audit = Arc::new(AuditApi::new(client.clone()));
        let session = SessionManager::new(provider, client.clone(), audit, config.session.clone());
        session.start().await;

        Ok(Self {
            config,
            client,
            session,
        })
    }

    /// The current session, or a session error asking the user to sign in.
    pub async fn require_session(&self) -> AppResult<Session> {
        self.session
            .session()
            .await
            .ok_or_else(|| AppError::session("Not signed in. Run `docadmin login` first"))
    }

    /// The current session, which must carry the administrator claim.
    pub async fn require_admin(&self) -> AppResult<Session> {
        let session = self.require_session().await?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(AppError::forbidden("Administrator access required"))
        }
    }

    /// Stop background tasks. Persisted state is left in place.
    pub async fn close(self) {
        self.session.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    use docadmin_auth::testing::FakeIdentityProvider;
    use docadmin_client::state::MemoryStore;

    async fn console_at(start_path: &str) -> (Console, Arc<ConsoleNavigator>) {
        // The audit endpoint rejects every caller without a credential.
        let router = Router::new().route("/audit/event", post(|| async { StatusCode::UNAUTHORIZED }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mut config = AppConfig::default();
        config.api.base_url = format!("http://{addr}");
        let provider = Arc::new(FakeIdentityProvider::new().with_account("ana@muni.gob", "secret1"));
        let navigator = Arc::new(ConsoleNavigator::new(start_path));
        let console = Console::assemble(config, Arc::new(MemoryStore::new()), provider, navigator.clone())
            .await
            .unwrap();
        (console, navigator)
    }

    #[tokio::test]
    async fn test_failed_login_does_not_report_expired_session() {
        let sign_in = AppConfig::default().api.sign_in_path;
        let (console, navigator) = console_at(&sign_in).await;

        let err = console.session.login("ana@muni.gob", "wrong").await.unwrap_err();
        assert_eq!(err.message, "Incorrect password");
        assert_eq!(navigator.redirect_count(), 0);
        assert_eq!(navigator.current_path(), sign_in);
        console.close().await;
    }

    #[tokio::test]
    async fn test_rejection_outside_sign_in_redirects() {
        let (console, navigator) = console_at(CONSOLE_PATH).await;

        assert!(console.session.login("ana@muni.gob", "wrong").await.is_err());
        assert_eq!(navigator.redirect_count(), 1);
        assert_eq!(navigator.current_path(), "/login");
        console.close().await;
    }
}

//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};

use docadmin::auth::testing::{FakeIdentityProvider, RecordingAuditSink};
use docadmin::client::state::MemoryStore;
use docadmin::client::{ApiClient, AuditApi, AuditSink, MemoryNavigator};
use docadmin::core::config::{ApiConfig, SessionConfig};
use docadmin::SessionManager;

pub const ADMIN_EMAIL: &str = "admin@muni.gob";
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// A console wired to fakes and an in-process API server.
pub struct TestConsole {
    pub client: ApiClient,
    pub session: SessionManager,
    pub provider: Arc<FakeIdentityProvider>,
    pub audit: Arc<RecordingAuditSink>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<MemoryNavigator>,
}

impl TestConsole {
    /// Serve `router` on an ephemeral port and start a session manager
    /// whose provider knows one administrator account.
    pub async fn new(router: Router) -> Self {
        Self::build(router, false).await
    }

    /// Like [`new`](Self::new), but audit events are posted to the served
    /// API through [`AuditApi`] instead of being recorded locally.
    pub async fn with_remote_audit(router: Router) -> Self {
        Self::build(router, true).await
    }

    async fn build(router: Router, remote_audit: bool) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = ApiConfig {
            base_url: format!("http://{addr}"),
            ..ApiConfig::default()
        };
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(MemoryNavigator::new("/admin/documents"));
        let client = ApiClient::new(&config, store.clone(), navigator.clone()).unwrap();

        let provider = Arc::new(FakeIdentityProvider::new().with_account(ADMIN_EMAIL, ADMIN_PASSWORD));
        provider.set_admin(true);
        let audit = Arc::new(RecordingAuditSink::new());
        let sink: Arc<dyn AuditSink> = if remote_audit {
            Arc::new(AuditApi::new(client.clone()))
        } else {
            audit.clone()
        };
        let session = SessionManager::new(
            provider.clone(),
            client.clone(),
            sink,
            SessionConfig::default(),
        );
        session.start().await;

        Self {
            client,
            session,
            provider,
            audit,
            store,
            navigator,
        }
    }

    /// Sign in as the administrator.
    pub async fn login(&self) {
        self.session.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    }
}

/// Reject requests without a bearer credential issued by the fake provider.
pub fn check_bearer(headers: &HeaderMap) -> Result<(), StatusCode> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"));
    if authorized {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

//! The outbound request gateway.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use docadmin_core::config::ApiConfig;
use docadmin_core::error::{AppError, ErrorKind};
use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

use super::error::{error_from_response, map_transport_error};
use super::navigator::Navigator;
use super::request::{ApiRequest, FormPart, RequestBody};
use super::response::{Download, disposition_filename};
use crate::state::keys;

/// Events published by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The API answered 401 and the local session was torn down.
    ///
    /// `token` is the bearer the rejected request carried, if any.
    SessionExpired { token: Option<String> },
}

/// HTTP client adapter shared by every fetcher.
///
/// Cheap to clone; all clones share the credential slot, the persisted
/// state and the event channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    config: ApiConfig,
    credential: RwLock<Option<String>>,
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    events: broadcast::Sender<ClientEvent>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl ApiClient {
    /// Create a new adapter.
    pub fn new(
        config: &ApiConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        let (events, _) = broadcast::channel(16);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                config: config.clone(),
                credential: RwLock::new(None),
                store,
                navigator,
                events,
            }),
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Adapter configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Persisted state shared with the session manager.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.store)
    }

    /// Subscribe to adapter events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// The credential currently attached to requests.
    pub async fn credential(&self) -> Option<String> {
        self.inner.credential.read().await.clone()
    }

    /// Replace the default credential.
    ///
    /// `Some` persists the token under `idToken`; `None` drops it and clears
    /// every persisted session key.
    pub async fn set_credential(&self, token: Option<String>) -> AppResult<()> {
        match token {
            Some(token) => {
                *self.inner.credential.write().await = Some(token.clone());
                self.inner.store.set(keys::ID_TOKEN, &token).await?;
                debug!("Default credential updated");
            }
            None => {
                *self.inner.credential.write().await = None;
                self.inner.store.remove_many(&keys::SESSION_KEYS).await?;
                debug!("Default credential cleared");
            }
        }
        Ok(())
    }

    /// Load a previously persisted credential into the adapter.
    ///
    /// Returns whether a usable token was found.
    pub async fn restore_credential(&self) -> AppResult<bool> {
        match self.inner.store.get(keys::ID_TOKEN).await? {
            Some(token) if keys::is_usable_token(&token) => {
                *self.inner.credential.write().await = Some(token);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Send a request and return the successful response.
    pub async fn execute(&self, request: ApiRequest) -> AppResult<Response> {
        let timeout = self.timeout_for(&request);
        let authorization = self.authorization_for(&request).await;
        let ApiRequest {
            method,
            path,
            query,
            body,
            ..
        } = request;

        let url = format!("{}{}", self.inner.base_url, path);
        let mut builder = self.inner.http.request(method.clone(), &url).timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(value) = &authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        debug!(%method, %path, timeout_secs = timeout.as_secs(), "Sending API request");
        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(&path, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            let rejected = authorization.as_deref().and_then(bearer_token);
            self.handle_unauthorized(&path, rejected).await;
            return Err(AppError::authorization("Session expired"));
        }
        Err(error_from_response(&path, response).await)
    }

    /// Send a request and decode a JSON body.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<T> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Unexpected response body from {path}"),
                e,
            )
        })
    }

    /// Send a request and collect a binary body.
    pub async fn download(&self, request: ApiRequest) -> AppResult<Download> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v: &HeaderValue| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header(CONTENT_DISPOSITION).and_then(|v| disposition_filename(&v));
        let content_type = header(CONTENT_TYPE);
        let data = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(&path, e))?;

        Ok(Download {
            filename,
            content_type,
            data,
        })
    }

    /// Probe `GET /health`.
    pub async fn health_check(&self) -> bool {
        let request = ApiRequest::get("/health").timeout(self.inner.config.health_timeout());
        match self.execute(request).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// Timeout applied to a request.
    pub fn timeout_for(&self, request: &ApiRequest) -> Duration {
        match request.timeout {
            Some(timeout) => timeout,
            None if request.is_upload() => self.inner.config.upload_timeout(),
            None => self.inner.config.default_timeout(),
        }
    }

    async fn authorization_for(&self, request: &ApiRequest) -> Option<String> {
        if let Some(explicit) = &request.authorization {
            return Some(explicit.clone());
        }
        self.inner
            .credential
            .read()
            .await
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }

    async fn handle_unauthorized(&self, path: &str, rejected: Option<String>) {
        // A token replaced while the request was in flight is not the session's.
        if *self.inner.credential.read().await != rejected {
            debug!(path, "Ignoring 401 for a credential that is no longer current");
            return;
        }
        warn!(path, "API rejected the credential; ending local session");

        if let Err(e) = self.set_credential(None).await {
            warn!(error = %e, "Failed to clear persisted session state");
        }
        // No receivers just means nobody is listening yet.
        let _ = self
            .inner
            .events
            .send(ClientEvent::SessionExpired { token: rejected });

        let sign_in = &self.inner.config.sign_in_path;
        if self.inner.navigator.current_path() != *sign_in {
            let target = format!("{sign_in}?reason=session_expired");
            info!(%target, "Redirecting to sign-in");
            self.inner.navigator.redirect(&target);
        }
    }
}

fn bearer_token(header: &str) -> Option<String> {
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn build_form(parts: Vec<FormPart>) -> AppResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                filename,
                content_type,
                data,
            } => {
                let mut file = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename);
                if let Some(mime) = content_type {
                    file = file.mime_str(&mime).map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Validation,
                            format!("Invalid content type '{mime}'"),
                            e,
                        )
                    })?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::navigator::MemoryNavigator;
    use crate::state::MemoryStore;

    use axum::Router;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
    use axum::routing::get;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String, nav: Arc<MemoryNavigator>) -> (ApiClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = ApiConfig {
            base_url,
            ..ApiConfig::default()
        };
        let client = ApiClient::new(&config, store.clone(), nav).unwrap();
        (client, store)
    }

    async fn echo_auth(headers: AxumHeaders) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none")
            .to_string()
    }

    #[tokio::test]
    async fn test_attaches_current_credential() {
        let base = serve(Router::new().route("/auth/me", get(echo_auth))).await;
        let (client, store) = client_for(base, Arc::new(MemoryNavigator::default()));

        let res = client.execute(ApiRequest::get("/auth/me")).await.unwrap();
        assert_eq!(res.text().await.unwrap(), "none");

        client.set_credential(Some("tok-1".to_string())).await.unwrap();
        let res = client.execute(ApiRequest::get("/auth/me")).await.unwrap();
        assert_eq!(res.text().await.unwrap(), "Bearer tok-1");
        assert_eq!(store.get(keys::ID_TOKEN).await.unwrap().as_deref(), Some("tok-1"));

        client.set_credential(Some("tok-2".to_string())).await.unwrap();
        let res = client.execute(ApiRequest::get("/auth/me")).await.unwrap();
        assert_eq!(res.text().await.unwrap(), "Bearer tok-2");
    }

    #[tokio::test]
    async fn test_explicit_authorization_wins() {
        let base = serve(Router::new().route("/auth/me", get(echo_auth))).await;
        let (client, _) = client_for(base, Arc::new(MemoryNavigator::default()));
        client.set_credential(Some("tok".to_string())).await.unwrap();

        let res = client
            .execute(ApiRequest::get("/auth/me").authorization("Bearer other"))
            .await
            .unwrap();
        assert_eq!(res.text().await.unwrap(), "Bearer other");
    }

    #[tokio::test]
    async fn test_unauthorized_tears_down_and_redirects() {
        let base = serve(Router::new().route(
            "/documents/list",
            get(|| async { (AxumStatus::UNAUTHORIZED, "expired") }),
        ))
        .await;
        let nav = Arc::new(MemoryNavigator::new("/admin/documents"));
        let (client, store) = client_for(base, nav.clone());
        let mut events = client.subscribe();

        client.set_credential(Some("stale".to_string())).await.unwrap();
        store.set(keys::USER_CLAIMS, "{\"admin\":true}").await.unwrap();

        let err = client.execute(ApiRequest::get("/documents/list")).await.unwrap_err();
        assert!(err.is_authorization());
        assert!(client.credential().await.is_none());
        assert!(store.get(keys::ID_TOKEN).await.unwrap().is_none());
        assert!(store.get(keys::USER_CLAIMS).await.unwrap().is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::SessionExpired {
                token: Some("stale".to_string())
            }
        );
        assert_eq!(nav.redirects(), vec!["/login?reason=session_expired"]);
    }

    #[tokio::test]
    async fn test_no_redirect_when_already_on_sign_in() {
        let base = serve(Router::new().route(
            "/auth/me",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        ))
        .await;
        let nav = Arc::new(MemoryNavigator::new("/login"));
        let (client, _) = client_for(base, nav.clone());

        assert!(client.execute(ApiRequest::get("/auth/me")).await.is_err());
        assert!(nav.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_rejection_carries_no_token() {
        let base = serve(Router::new().route(
            "/audit/event",
            axum::routing::post(|| async { AxumStatus::UNAUTHORIZED }),
        ))
        .await;
        let (client, _) = client_for(base, Arc::new(MemoryNavigator::new("/login")));
        let mut events = client.subscribe();

        let err = client
            .execute(ApiRequest::post("/audit/event"))
            .await
            .unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(
            events.recv().await.unwrap(),
            ClientEvent::SessionExpired { token: None }
        );
    }

    #[tokio::test]
    async fn test_rejection_of_replaced_token_keeps_current_credential() {
        let base = serve(Router::new().route(
            "/auth/me",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        ))
        .await;
        let nav = Arc::new(MemoryNavigator::new("/admin/documents"));
        let (client, _) = client_for(base, nav.clone());
        let mut events = client.subscribe();
        client.set_credential(Some("fresh".to_string())).await.unwrap();

        let err = client
            .execute(ApiRequest::get("/auth/me").authorization("Bearer old"))
            .await
            .unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(client.credential().await.as_deref(), Some("fresh"));
        assert!(nav.redirects().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc").as_deref(), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[tokio::test]
    async fn test_error_carries_server_detail() {
        let base = serve(Router::new().route(
            "/admin/users",
            get(|| async {
                (
                    AxumStatus::NOT_FOUND,
                    axum::Json(serde_json::json!({ "detail": "Usuario no encontrado" })),
                )
            }),
        ))
        .await;
        let (client, _) = client_for(base, Arc::new(MemoryNavigator::default()));

        let err = client.execute(ApiRequest::get("/admin/users")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Usuario no encontrado");
    }

    #[tokio::test]
    async fn test_timeout_selection() {
        let (client, _) = client_for(
            "http://127.0.0.1:9".to_string(),
            Arc::new(MemoryNavigator::default()),
        );
        assert_eq!(
            client.timeout_for(&ApiRequest::post("/documents/upload")),
            Duration::from_secs(300)
        );
        assert_eq!(
            client.timeout_for(&ApiRequest::get("/documents/list")),
            Duration::from_secs(30)
        );
        assert_eq!(
            client.timeout_for(&ApiRequest::get("/x").timeout(Duration::from_secs(1))),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let base = serve(Router::new().route("/health", get(|| async { "ok" }))).await;
        let (client, _) = client_for(base, Arc::new(MemoryNavigator::default()));
        assert!(client.health_check().await);

        let (down, _) = client_for(
            "http://127.0.0.1:9".to_string(),
            Arc::new(MemoryNavigator::default()),
        );
        assert!(!down.health_check().await);
    }

    #[tokio::test]
    async fn test_restore_ignores_stringified_null() {
        let (client, store) = client_for(
            "http://127.0.0.1:9".to_string(),
            Arc::new(MemoryNavigator::default()),
        );
        store.set(keys::ID_TOKEN, "null").await.unwrap();
        assert!(!client.restore_credential().await.unwrap());

        store.set(keys::ID_TOKEN, "persisted").await.unwrap();
        assert!(client.restore_credential().await.unwrap());
        assert_eq!(client.credential().await.as_deref(), Some("persisted"));
    }
}

//! Identity Toolkit / Secure Token REST provider.
//!
//! Speaks the password sign-in, sign-up, account update and token refresh
//! endpoints directly. The refresh token is kept in memory and, when a
//! store is attached, persisted so a later process can restore the
//! session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use docadmin_core::config::IdentityConfig;
use docadmin_core::error::{AppError, ErrorKind};
use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

use super::error::{ProviderError, codes};
use super::{IdentityProvider, ProfileUpdate, ProviderUser};
use crate::credential::{Credential, decode_claims};

/// Persisted state key holding the provider session.
pub const PROVIDER_SESSION_KEY: &str = "identitySession";

/// Lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderSession {
    user: ProviderUser,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// REST implementation of [`IdentityProvider`].
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    config: IdentityConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    session: RwLock<Option<ProviderSession>>,
    changes: watch::Sender<Option<ProviderUser>>,
}

impl std::fmt::Debug for FirebaseIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentityProvider")
            .field("accounts_url", &self.config.accounts_url)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl FirebaseIdentityProvider {
    /// Create a provider that keeps its session in memory only.
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(docadmin_client::USER_AGENT)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build identity HTTP client",
                    e,
                )
            })?;
        let (changes, _) = watch::channel(None);

        Ok(Self {
            http,
            config: config.clone(),
            store: None,
            session: RwLock::new(None),
            changes,
        })
    }

    /// Persist the provider session in `store`.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Restore a persisted session by exchanging its refresh token.
    ///
    /// Returns whether a session was restored. A rejected refresh token
    /// is discarded.
    pub async fn restore(&self) -> AppResult<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let Some(raw) = store.get(PROVIDER_SESSION_KEY).await? else {
            return Ok(false);
        };
        let saved: ProviderSession = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable identity session");
                store.remove(PROVIDER_SESSION_KEY).await?;
                return Ok(false);
            }
        };

        match self.exchange_refresh_token(&saved.refresh_token).await {
            Ok(tokens) => {
                let restored = ProviderSession {
                    user: saved.user,
                    id_token: tokens.id_token,
                    refresh_token: tokens.refresh_token,
                    expires_at: expires_at(tokens.expires_in.as_deref()),
                };
                info!(uid = %restored.user.uid, "Identity session restored");
                self.install(restored).await;
                Ok(true)
            }
            Err(e) => {
                warn!(code = %e.code, "Stored identity session rejected");
                store.remove(PROVIDER_SESSION_KEY).await?;
                Ok(false)
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/accounts:{endpoint}",
            self.config.accounts_url.trim_end_matches('/')
        )
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let raw = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            debug!(status = status.as_u16(), raw, "Identity request rejected");
            return Err(provider_error(raw));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.to_string()))
    }

    async fn account_request(&self, endpoint: &str, body: Value) -> Result<ProviderUser, ProviderError> {
        let account: AccountResponse = self.post(&self.url(endpoint), &body).await?;
        let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) else {
            return Err(ProviderError::new(
                codes::INTERNAL_ERROR,
                "Identity response carried no token",
            ));
        };

        let session = ProviderSession {
            user: ProviderUser {
                uid: account.local_id,
                email: account.email,
                display_name: account.display_name.filter(|n| !n.is_empty()),
            },
            id_token,
            refresh_token,
            expires_at: expires_at(account.expires_in.as_deref()),
        };
        let user = session.user.clone();
        self.install(session).await;
        Ok(user)
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, ProviderError> {
        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        self.post(&self.config.token_url, &body).await
    }

    async fn install(&self, session: ProviderSession) {
        let user = session.user.clone();
        self.persist(Some(&session)).await;
        *self.session.write().await = Some(session);
        self.changes.send_replace(Some(user));
    }

    async fn persist(&self, session: Option<&ProviderSession>) {
        let Some(store) = &self.store else {
            return;
        };
        let result = match session {
            Some(session) => match serde_json::to_string(session) {
                Ok(json) => store.set(PROVIDER_SESSION_KEY, &json).await,
                Err(e) => Err(e.into()),
            },
            None => store.remove(PROVIDER_SESSION_KEY).await,
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist identity session");
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        let body = json!({"email": email, "password": password, "returnSecureToken": true});
        let user = self.account_request("signUp", body).await?;
        info!(uid = %user.uid, "Identity account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError> {
        let body = json!({"email": email, "password": password, "returnSecureToken": true});
        let user = self.account_request("signInWithPassword", body).await?;
        info!(uid = %user.uid, "Identity sign-in succeeded");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let previous = self.session.write().await.take();
        self.persist(None).await;
        if previous.is_some() {
            self.changes.send_replace(None);
        }
        Ok(())
    }

    async fn get_token(&self, force_refresh: bool) -> Result<String, ProviderError> {
        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut() else {
            return Err(ProviderError::no_current_user());
        };

        let skew = chrono::Duration::seconds(self.config.refresh_skew_seconds);
        if !force_refresh && session.expires_at - skew > Utc::now() {
            return Ok(session.id_token.clone());
        }

        let tokens = self.exchange_refresh_token(&session.refresh_token).await?;
        session.id_token = tokens.id_token;
        session.refresh_token = tokens.refresh_token;
        session.expires_at = expires_at(tokens.expires_in.as_deref());
        debug!(expires_at = %session.expires_at, forced = force_refresh, "Identity token refreshed");

        let snapshot = session.clone();
        drop(guard);
        self.persist(Some(&snapshot)).await;
        Ok(snapshot.id_token)
    }

    async fn get_token_claims(&self, force_refresh: bool) -> Result<Credential, ProviderError> {
        let token = self.get_token(force_refresh).await?;
        let claims = decode_claims(&token)
            .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.message))?;

        let expires_at = match claims.expires_at() {
            Some(at) => at,
            None => self
                .session
                .read()
                .await
                .as_ref()
                .map(|s| s.expires_at)
                .unwrap_or_else(Utc::now),
        };
        Ok(Credential::new(token, expires_at, claims))
    }

    fn subscribe(&self) -> watch::Receiver<Option<ProviderUser>> {
        self.changes.subscribe()
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProviderUser, ProviderError> {
        let id_token = self.get_token(false).await?;
        let mut body = json!({"idToken": id_token, "returnSecureToken": true});
        if let Some(name) = &update.display_name {
            body["displayName"] = Value::String(name.clone());
        }
        if let Some(photo) = &update.photo_url {
            body["photoUrl"] = Value::String(photo.clone());
        }

        let account: AccountResponse = self.post(&self.url("update"), &body).await?;

        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut() else {
            return Err(ProviderError::no_current_user());
        };
        if let Some(name) = account.display_name.or_else(|| update.display_name.clone()) {
            session.user.display_name = Some(name);
        }
        if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) {
            session.id_token = id_token;
            session.refresh_token = refresh_token;
            session.expires_at = expires_at(account.expires_in.as_deref());
        }
        let snapshot = session.clone();
        drop(guard);

        self.persist(Some(&snapshot)).await;
        Ok(snapshot.user)
    }
}

fn expires_at(expires_in: Option<&str>) -> DateTime<Utc> {
    let seconds = expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + chrono::Duration::seconds(seconds)
}

/// Map a raw REST error message such as `WEAK_PASSWORD : Password should
/// be at least 6 characters` to a provider error.
fn provider_error(raw: &str) -> ProviderError {
    let reason = raw
        .split([' ', ':'])
        .next()
        .unwrap_or_default();
    let code = match reason {
        "EMAIL_NOT_FOUND" => codes::USER_NOT_FOUND,
        "INVALID_PASSWORD" => codes::WRONG_PASSWORD,
        "INVALID_LOGIN_CREDENTIALS" => codes::INVALID_CREDENTIAL,
        "EMAIL_EXISTS" => codes::EMAIL_ALREADY_IN_USE,
        "WEAK_PASSWORD" => codes::WEAK_PASSWORD,
        "INVALID_EMAIL" | "MISSING_EMAIL" => codes::INVALID_EMAIL,
        "USER_DISABLED" => codes::USER_DISABLED,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => codes::TOO_MANY_REQUESTS,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => codes::TOKEN_EXPIRED,
        _ => codes::INTERNAL_ERROR,
    };
    let message = raw
        .split_once(" : ")
        .map(|(_, detail)| detail.to_string())
        .unwrap_or_default();
    ProviderError::new(code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::claims::encode_test_token;
    use docadmin_client::state::MemoryStore;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    #[derive(Clone, Default)]
    struct Counters {
        refreshes: Arc<AtomicUsize>,
    }

    fn token(admin: bool, n: usize) -> String {
        encode_test_token(&json!({
            "sub": "uid-1",
            "admin": admin,
            "n": n,
            "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        }))
    }

    async fn sign_in(Json(body): Json<Value>) -> axum::response::Response {
        if body["password"] == "secret" {
            Json(json!({
                "localId": "uid-1",
                "email": body["email"],
                "displayName": "",
                "idToken": token(true, 0),
                "refreshToken": "refresh-0",
                "expiresIn": "3600"
            }))
            .into_response()
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": 400, "message": "INVALID_PASSWORD"}})),
            )
                .into_response()
        }
    }

    async fn sign_up(Json(_): Json<Value>) -> axum::response::Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {
                "code": 400,
                "message": "WEAK_PASSWORD : Password should be at least 6 characters"
            }})),
        )
            .into_response()
    }

    async fn refresh(State(counters): State<Counters>, Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["grant_type"], "refresh_token");
        let n = counters.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Json(json!({
            "id_token": token(true, n),
            "refresh_token": format!("refresh-{n}"),
            "expires_in": "3600",
            "user_id": "uid-1"
        }))
    }

    async fn provider() -> (FirebaseIdentityProvider, Counters) {
        let counters = Counters::default();
        let router = Router::new()
            .route("/v1/accounts:signInWithPassword", post(sign_in))
            .route("/v1/accounts:signUp", post(sign_up))
            .route("/token", post(refresh))
            .with_state(counters.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = IdentityConfig {
            api_key: "test-key".to_string(),
            accounts_url: format!("http://{addr}/v1"),
            token_url: format!("http://{addr}/token"),
            ..IdentityConfig::default()
        };
        (FirebaseIdentityProvider::new(&config).unwrap(), counters)
    }

    #[tokio::test]
    async fn test_sign_in_publishes_user_and_caches_token() {
        let (provider, counters) = provider().await;
        let changes = provider.subscribe();

        let user = provider.sign_in("ana@example.com", "secret").await.unwrap();
        assert_eq!(user.uid, "uid-1");
        assert_eq!(user.display_name, None);
        assert_eq!(changes.borrow().as_ref().map(|u| u.uid.as_str()), Some("uid-1"));

        let first = provider.get_token_claims(false).await.unwrap();
        let second = provider.get_token_claims(false).await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_admin());
        assert_eq!(counters.refreshes.load(Ordering::SeqCst), 0);

        let forced = provider.get_token_claims(true).await.unwrap();
        assert_ne!(forced.token, first.token);
        assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rest_errors_map_to_codes() {
        let (provider, _) = provider().await;

        let err = provider.sign_in("ana@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.code, codes::WRONG_PASSWORD);

        let err = provider.create_account("ana@example.com", "1").await.unwrap_err();
        assert_eq!(err.code, codes::WEAK_PASSWORD);
        assert_eq!(err.message, "Password should be at least 6 characters");
    }

    #[tokio::test]
    async fn test_token_without_session_fails() {
        let (provider, _) = provider().await;
        let err = provider.get_token(false).await.unwrap_err();
        assert_eq!(err.code, codes::NO_CURRENT_USER);
    }

    #[tokio::test]
    async fn test_sign_out_notifies_and_forgets_session() {
        let (provider, _) = provider().await;
        let store = Arc::new(MemoryStore::new());
        let provider = provider.with_store(store.clone());

        provider.sign_in("ana@example.com", "secret").await.unwrap();
        assert!(store.get(PROVIDER_SESSION_KEY).await.unwrap().is_some());

        provider.sign_out().await.unwrap();
        assert!(provider.subscribe().borrow().is_none());
        assert!(store.get(PROVIDER_SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_exchanges_refresh_token() {
        let (first, counters) = provider().await;
        let store = Arc::new(MemoryStore::new());
        let first = first.with_store(store.clone());
        first.sign_in("ana@example.com", "secret").await.unwrap();

        let config = first.config.clone();
        let second = FirebaseIdentityProvider::new(&config)
            .unwrap()
            .with_store(store.clone());
        assert!(second.restore().await.unwrap());
        assert_eq!(counters.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            second.subscribe().borrow().as_ref().map(|u| u.uid.clone()),
            Some("uid-1".to_string())
        );
    }

    #[test]
    fn test_provider_error_parsing() {
        assert_eq!(provider_error("EMAIL_NOT_FOUND").code, codes::USER_NOT_FOUND);
        assert_eq!(
            provider_error("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled").code,
            codes::TOO_MANY_REQUESTS
        );
        assert_eq!(provider_error("SOMETHING_NEW").code, codes::INTERNAL_ERROR);
    }
}

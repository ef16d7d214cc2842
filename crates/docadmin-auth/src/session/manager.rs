//! Session manager: login, signup, logout, profile updates and credential
//! refresh.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use docadmin_client::state::keys;
use docadmin_client::{ApiClient, AuditSink};
use docadmin_core::config::SessionConfig;
use docadmin_core::error::{AppError, ErrorKind};
use docadmin_core::result::AppResult;
use docadmin_entity::audit::{AuditEventType, NewAuditEvent, Severity};

use super::listener;
use super::model::{Session, SessionState, SignupProfile};
use super::monitor::ExpiryMonitor;
use crate::credential::Credential;
use crate::provider::{IdentityProvider, ProfileUpdate, ProviderError, ProviderUser, auth_error_message};
use crate::token::TokenStore;

/// Message returned when the provider refuses to end its session.
const SIGN_OUT_FAILED: &str = "Failed to sign out";

/// Owns the authenticated session and its credential.
///
/// Cheap to clone; clones share one session. Every credential change is
/// written to the token store and pushed into the [`ApiClient`] before it
/// becomes visible through [`credential`](Self::credential).
#[derive(Clone)]
pub struct SessionManager {
    pub(super) inner: Arc<SessionInner>,
}

pub(super) struct SessionInner {
    pub(super) provider: Arc<dyn IdentityProvider>,
    pub(super) client: ApiClient,
    pub(super) tokens: TokenStore,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) config: SessionConfig,
    pub(super) state: RwLock<SessionState>,
    /// Serializes login, signup, logout, adoption and teardown.
    pub(super) transition: Mutex<()>,
    pub(super) monitor: Mutex<Option<ExpiryMonitor>>,
    pub(super) listener: Mutex<Option<CancellationToken>>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(cancel) = self.listener.get_mut().take() {
            cancel.cancel();
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("client", &self.inner.client)
            .field("config", &self.inner.config)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    Signup,
}

impl AuthAction {
    fn succeeded(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Signup => "SIGNUP",
        }
    }

    fn failed(self) -> &'static str {
        match self {
            Self::Login => "LOGIN_FAILED",
            Self::Signup => "SIGNUP_FAILED",
        }
    }
}

impl SessionManager {
    /// Creates a session manager. Persisted state is shared with `client`.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        client: ApiClient,
        audit: Arc<dyn AuditSink>,
        config: SessionConfig,
    ) -> Self {
        let tokens = TokenStore::new(client.store());
        Self {
            inner: Arc::new(SessionInner {
                provider,
                client,
                tokens,
                audit,
                config,
                state: RwLock::new(SessionState::default()),
                transition: Mutex::new(()),
                monitor: Mutex::new(None),
                listener: Mutex::new(None),
            }),
        }
    }

    pub(super) fn from_inner(inner: Arc<SessionInner>) -> Self {
        Self { inner }
    }

    /// Adopts the provider's current session, if any, and starts listening
    /// for provider sign-outs and API authorization failures.
    ///
    /// Failure to adopt a restored session leaves the manager signed out.
    pub async fn start(&self) {
        let mut changes = self.inner.provider.subscribe();
        let current = changes.borrow_and_update().clone();

        let cancel = CancellationToken::new();
        listener::spawn(self, changes, cancel.clone());
        if let Some(previous) = self.inner.listener.lock().await.replace(cancel) {
            previous.cancel();
        }

        if let Some(user) = current {
            let _guard = self.inner.transition.lock().await;
            self.adopt(user).await;
        }
    }

    /// Stops the listener and the expiry monitor without touching the session.
    pub async fn shutdown(&self) {
        if let Some(cancel) = self.inner.listener.lock().await.take() {
            cancel.cancel();
        }
        self.stop_monitor().await;
    }

    /// Performs the login flow:
    ///
    /// 1. Sign in through the identity provider
    /// 2. Force a credential refresh and push it to the HTTP client
    /// 3. Start the expiry monitor
    /// 4. Emit `AUTHENTICATION` / `LOGIN`
    ///
    /// Provider failures emit `LOGIN_FAILED` and return a normalized message.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let _guard = self.inner.transition.lock().await;
        self.clear_error().await;

        let user = match self.inner.provider.sign_in(email, password).await {
            Ok(user) => user,
            Err(e) => return Err(self.auth_failed(AuthAction::Login, email, e).await),
        };

        let session = self.establish_or_reset(user, true).await?;
        self.auth_succeeded(AuthAction::Login, email, &session).await;
        Ok(session)
    }

    /// Creates an account, applies `profile`, and signs it in.
    ///
    /// Same contract as [`login`](Self::login) with `SIGNUP` / `SIGNUP_FAILED`.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile,
    ) -> AppResult<Session> {
        let _guard = self.inner.transition.lock().await;
        self.clear_error().await;

        let mut user = match self.inner.provider.create_account(email, password).await {
            Ok(user) => user,
            Err(e) => return Err(self.auth_failed(AuthAction::Signup, email, e).await),
        };

        let update = profile.as_update();
        if let Some(update) = &update {
            match self.inner.provider.update_profile(update).await {
                Ok(updated) => user = updated,
                Err(e) => warn!(code = %e.code, "Failed to apply signup profile"),
            }
        }

        let session = self.establish_or_reset(user, true).await?;
        if let Some(update) = &update {
            if let Err(e) = self.merge_profile(update).await {
                warn!(error = %e, "Failed to cache signup profile");
            }
        }
        self.auth_succeeded(AuthAction::Signup, email, &session).await;
        Ok(session)
    }

    /// Ends the session.
    ///
    /// Local state is torn down even when the provider sign-out fails; the
    /// failure is then audited as `LOGOUT_FAILED` and returned.
    pub async fn logout(&self) -> AppResult<()> {
        let _guard = self.inner.transition.lock().await;
        let (uid, email) = self.principal().await;

        self.emit(
            NewAuditEvent::new(AuditEventType::Authentication)
                .with_detail("action", "LOGOUT")
                .with_detail("email", email.clone())
                .with_detail("userId", uid.clone())
                .with_detail("success", true),
        )
        .await;

        let result = self.inner.provider.sign_out().await;
        if let Err(e) = &result {
            warn!(code = %e.code, "Identity provider sign-out failed");
            self.emit(
                NewAuditEvent::new(AuditEventType::Authentication)
                    .with_severity(Severity::Error)
                    .with_detail("action", "LOGOUT_FAILED")
                    .with_detail("email", email)
                    .with_detail("userId", uid.clone())
                    .with_detail("error", SIGN_OUT_FAILED)
                    .with_detail("success", false),
            )
            .await;
        }

        self.teardown().await;

        match result {
            Ok(()) => {
                info!(uid = ?uid, "Logged out");
                Ok(())
            }
            Err(e) => {
                self.set_error(SIGN_OUT_FAILED).await;
                Err(AppError::with_source(
                    ErrorKind::Authentication,
                    SIGN_OUT_FAILED,
                    e,
                ))
            }
        }
    }

    /// Applies profile fields through the provider and caches them under
    /// `userProfile`. Returns the merged profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> AppResult<Map<String, Value>> {
        if update.is_empty() {
            return Err(AppError::validation("No profile fields to update"));
        }
        let Some(uid) = self.principal().await.0 else {
            return Err(AppError::session("Not signed in"));
        };

        let user = match self.inner.provider.update_profile(&update).await {
            Ok(user) => user,
            Err(e) => {
                warn!(code = %e.code, "Profile update rejected");
                let err = AppError::from(e);
                self.set_error(err.message.clone()).await;
                return Err(err);
            }
        };

        {
            let mut state = self.inner.state.write().await;
            if let Some(session) = state.session.as_mut() {
                session.user = user;
            }
        }
        let profile = self.merge_profile(&update).await?;

        self.emit(
            NewAuditEvent::new(AuditEventType::UserProfile)
                .with_detail("action", "PROFILE_UPDATED")
                .with_detail("userId", uid.clone())
                .with_detail("updatedFields", update.field_names()),
        )
        .await;
        info!(uid = %uid, fields = ?update.field_names(), "Profile updated");
        Ok(profile)
    }

    /// Refreshes the credential.
    ///
    /// Returns `None` without a session. The token, its claims and the
    /// administrator flag are written together; concurrent calls are safe
    /// and the last one to finish wins. A session that ends while the
    /// provider is answering discards the result.
    pub async fn refresh(&self, force: bool) -> AppResult<Option<Credential>> {
        let Some(uid) = self.principal().await.0 else {
            return Ok(None);
        };

        let credential = match self.inner.provider.get_token_claims(force).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(code = %e.code, forced = force, "Credential refresh failed");
                let err = AppError::from(e);
                self.set_error(err.message.clone()).await;
                return Err(err);
            }
        };

        let mut state = self.inner.state.write().await;
        match state.session.as_mut() {
            Some(session) if session.user.uid == uid => {
                self.inner.tokens.set(&credential).await?;
                self.inner
                    .client
                    .set_credential(Some(credential.token.clone()))
                    .await?;
                session.credential = credential.clone();
                state.token_expiring = self.expiring(&credential);
                debug!(forced = force, expires_at = %credential.expires_at, "Credential refreshed");
                Ok(Some(credential))
            }
            _ => {
                debug!("Session ended during refresh; discarding credential");
                Ok(None)
            }
        }
    }

    /// The current session.
    pub async fn session(&self) -> Option<Session> {
        self.inner.state.read().await.session.clone()
    }

    /// The current credential.
    pub async fn credential(&self) -> Option<Credential> {
        self.inner
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.credential.clone())
    }

    /// Whether a session is active.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.session.is_some()
    }

    /// Whether the credential carries the administrator claim.
    pub async fn is_admin(&self) -> bool {
        self.inner
            .state
            .read()
            .await
            .session
            .as_ref()
            .is_some_and(Session::is_admin)
    }

    /// `admin` or `user`.
    pub async fn user_role(&self) -> &'static str {
        if self.is_admin().await { "admin" } else { "user" }
    }

    /// Whether the credential is within the warning threshold of expiry.
    pub async fn token_expiring(&self) -> bool {
        self.inner.state.read().await.token_expiring
    }

    /// Cached profile of the signed-in user.
    pub async fn profile(&self) -> Option<Map<String, Value>> {
        self.inner.state.read().await.profile.clone()
    }

    /// Last user-facing error message.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.state.read().await.last_error.clone()
    }

    /// Forget the last error.
    pub async fn clear_error(&self) {
        self.inner.state.write().await.last_error = None;
    }

    /// The HTTP client this manager keeps in sync.
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Recompute the expiring-soon flag against the wall clock.
    pub(super) async fn update_expiry_flag(&self) {
        let mut state = self.inner.state.write().await;
        let expiring = match &state.session {
            Some(session) => self.expiring(&session.credential),
            None => false,
        };
        if expiring && !state.token_expiring {
            warn!("Credential expires soon");
        }
        state.token_expiring = expiring;
    }

    /// React to the provider publishing a new session state.
    pub(super) async fn on_provider_change(&self, user: Option<ProviderUser>) {
        let _guard = self.inner.transition.lock().await;
        let current = self.principal().await.0;

        match (user, current) {
            (None, Some(uid)) => {
                info!(uid = %uid, "Identity provider ended the session");
                self.teardown().await;
            }
            (Some(user), None) => self.adopt(user).await,
            (Some(user), Some(uid)) if user.uid != uid => {
                info!(from = %uid, to = %user.uid, "Identity provider switched accounts");
                self.teardown().await;
                self.adopt(user).await;
            }
            _ => {}
        }
    }

    /// React to the HTTP client rejecting `rejected`.
    ///
    /// Only a rejection of the current session's credential ends it. A
    /// request that carried no credential never ends a live session.
    pub(super) async fn on_session_expired(&self, rejected: Option<String>) {
        let _guard = self.inner.transition.lock().await;
        let current = self
            .inner
            .state
            .read()
            .await
            .session
            .as_ref()
            .map(|session| session.credential.token.clone());

        match (rejected, current) {
            (Some(rejected), Some(current)) if rejected == current => {
                warn!("Credential rejected by the API; signing out");
                self.teardown().await;
                if let Err(e) = self.inner.provider.sign_out().await {
                    warn!(code = %e.code, "Identity provider sign-out failed after expiry");
                }
            }
            (None, None) => self.teardown().await,
            _ => debug!("Ignoring rejection of a credential that is no longer current"),
        }
    }

    async fn adopt(&self, user: ProviderUser) {
        let uid = user.uid.clone();
        match self.establish(user, false).await {
            Ok(session) => info!(uid = %uid, is_admin = session.is_admin(), "Restored session adopted"),
            Err(e) => {
                warn!(uid = %uid, error = %e, "Could not adopt restored session");
                self.teardown().await;
            }
        }
    }

    async fn establish_or_reset(&self, user: ProviderUser, force: bool) -> AppResult<Session> {
        match self.establish(user, force).await {
            Ok(session) => Ok(session),
            Err(e) => {
                self.set_error(e.user_message()).await;
                self.teardown().await;
                Err(e)
            }
        }
    }

    /// Obtain a credential for `user`, publish it, and start the monitor.
    async fn establish(&self, user: ProviderUser, force: bool) -> AppResult<Session> {
        let credential = self.inner.provider.get_token_claims(force).await?;
        let store = self.inner.tokens.inner();

        self.inner.tokens.set(&credential).await?;
        self.inner
            .client
            .set_credential(Some(credential.token.clone()))
            .await?;
        store.set(keys::USER, &serde_json::to_string(&user)?).await?;

        let profile = match store.get(keys::USER_PROFILE).await? {
            Some(raw) => serde_json::from_str::<Map<String, Value>>(&raw)
                .map_err(|e| warn!(error = %e, "Ignoring unreadable cached profile"))
                .ok(),
            None => None,
        };

        let session = Session { user, credential };
        {
            let mut state = self.inner.state.write().await;
            state.token_expiring = self.expiring(&session.credential);
            state.session = Some(session.clone());
            state.profile = profile;
        }
        self.start_monitor().await;
        Ok(session)
    }

    /// Drop the session locally: monitor, state, token store, client
    /// credential and every persisted key.
    async fn teardown(&self) {
        self.stop_monitor().await;
        self.inner.state.write().await.reset();

        if let Err(e) = self.inner.tokens.clear().await {
            warn!(error = %e, "Failed to clear persisted credential");
        }
        if let Err(e) = self.inner.client.set_credential(None).await {
            warn!(error = %e, "Failed to clear client credential");
        }
        if let Err(e) = self.inner.tokens.inner().clear().await {
            warn!(error = %e, "Failed to clear persisted session state");
        }
        debug!("Local session torn down");
    }

    async fn merge_profile(&self, update: &ProfileUpdate) -> AppResult<Map<String, Value>> {
        let fields = match serde_json::to_value(update)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        let profile = {
            let mut state = self.inner.state.write().await;
            let profile = state.profile.get_or_insert_with(Map::new);
            profile.extend(fields);
            profile.clone()
        };
        self.inner
            .tokens
            .inner()
            .set(keys::USER_PROFILE, &serde_json::to_string(&profile)?)
            .await?;
        Ok(profile)
    }

    async fn start_monitor(&self) {
        let monitor = ExpiryMonitor::spawn(Arc::downgrade(&self.inner), &self.inner.config);
        if let Some(previous) = self.inner.monitor.lock().await.replace(monitor) {
            previous.stop();
        }
    }

    async fn stop_monitor(&self) {
        if let Some(monitor) = self.inner.monitor.lock().await.take() {
            monitor.stop();
        }
    }

    async fn auth_succeeded(&self, action: AuthAction, email: &str, session: &Session) {
        info!(
            uid = %session.uid(),
            is_admin = session.is_admin(),
            action = action.succeeded(),
            "Authentication succeeded"
        );
        self.emit(
            NewAuditEvent::new(AuditEventType::Authentication)
                .with_detail("action", action.succeeded())
                .with_detail("email", email)
                .with_detail("userId", session.uid())
                .with_detail("success", true),
        )
        .await;
    }

    async fn auth_failed(&self, action: AuthAction, email: &str, err: ProviderError) -> AppError {
        warn!(code = %err.code, action = action.failed(), "Authentication failed");
        self.emit(
            NewAuditEvent::new(AuditEventType::Authentication)
                .with_severity(Severity::Warning)
                .with_detail("action", action.failed())
                .with_detail("email", email)
                .with_detail("error", err.code.clone())
                .with_detail("success", false),
        )
        .await;
        self.set_error(auth_error_message(&err)).await;
        AppError::from(err)
    }

    /// Audit emission is best-effort.
    async fn emit(&self, event: NewAuditEvent) {
        let action = event.action().unwrap_or_default().to_string();
        if let Err(e) = self.inner.audit.record(event).await {
            warn!(action = %action, error = %e, "Failed to record audit event");
        }
    }

    async fn set_error(&self, message: impl Into<String>) {
        self.inner.state.write().await.last_error = Some(message.into());
    }

    async fn principal(&self) -> (Option<String>, Option<String>) {
        let state = self.inner.state.read().await;
        match &state.session {
            Some(session) => (
                Some(session.user.uid.clone()),
                session.user.email.clone(),
            ),
            None => (None, None),
        }
    }

    fn expiring(&self, credential: &Credential) -> bool {
        credential.expires_within(self.inner.config.warning_threshold(), Utc::now())
    }
}

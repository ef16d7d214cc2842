//! In-memory fakes of the identity provider and the audit sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;

use docadmin_client::AuditSink;
use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_entity::audit::NewAuditEvent;

use crate::credential::{Credential, TokenClaims};
use crate::provider::{IdentityProvider, ProfileUpdate, ProviderError, ProviderUser, codes};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: ProviderUser,
}

/// Identity provider that keeps accounts in memory and issues
/// `token-N` credentials.
#[derive(Debug)]
pub struct FakeIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    cached: Mutex<Option<Credential>>,
    lifetime: Mutex<chrono::Duration>,
    admin: AtomicBool,
    fail_sign_out: AtomicBool,
    issued: AtomicUsize,
    forced: AtomicUsize,
    changes: watch::Sender<Option<ProviderUser>>,
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentityProvider {
    /// Provider with no accounts and one-hour tokens.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            cached: Mutex::new(None),
            lifetime: Mutex::new(chrono::Duration::hours(1)),
            admin: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            issued: AtomicUsize::new(0),
            forced: AtomicUsize::new(0),
            changes,
        }
    }

    /// Register an account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let uid = format!("uid-{}", lock(&self.accounts).len() + 1);
        lock(&self.accounts).insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: ProviderUser {
                    uid,
                    email: Some(email.to_string()),
                    display_name: None,
                },
            },
        );
        self
    }

    /// Issue tokens with or without the administrator claim.
    pub fn set_admin(&self, admin: bool) {
        self.admin.store(admin, Ordering::SeqCst);
    }

    /// Lifetime of newly issued tokens.
    pub fn set_token_lifetime(&self, lifetime: chrono::Duration) {
        *lock(&self.lifetime) = lifetime;
    }

    /// Make `sign_out` fail.
    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    /// Number of tokens issued so far.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Number of forced refreshes served.
    pub fn forced_refreshes(&self) -> usize {
        self.forced.load(Ordering::SeqCst)
    }

    /// Publish `email`'s account as an already signed-in session, as a
    /// provider does when it restores persisted state.
    pub fn restore_session(&self, email: &str) {
        let user = lock(&self.accounts).get(email).map(|a| a.user.clone());
        self.changes.send_replace(user);
    }

    /// End the provider session from the provider side.
    pub fn invalidate(&self) {
        *lock(&self.cached) = None;
        self.changes.send_replace(None);
    }

    fn current(&self) -> Option<ProviderUser> {
        self.changes.borrow().clone()
    }

    fn issue(&self, user: &ProviderUser) -> Credential {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let claims = TokenClaims {
            admin: self.admin.load(Ordering::SeqCst),
            sub: Some(user.uid.clone()),
            email: user.email.clone(),
            ..TokenClaims::default()
        };
        let expires_at = Utc::now() + *lock(&self.lifetime);
        Credential::new(format!("token-{n}"), expires_at, claims)
    }

    fn start_session(&self, user: ProviderUser) {
        *lock(&self.cached) = None;
        self.changes.send_replace(Some(user));
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderUser, ProviderError> {
        if !email.contains('@') {
            return Err(ProviderError::new(codes::INVALID_EMAIL, "bad email"));
        }
        if password.len() < 6 {
            return Err(ProviderError::new(
                codes::WEAK_PASSWORD,
                "Password should be at least 6 characters",
            ));
        }
        let user = {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(email) {
                return Err(ProviderError::new(codes::EMAIL_ALREADY_IN_USE, "exists"));
            }
            let user = ProviderUser {
                uid: format!("uid-{}", accounts.len() + 1),
                email: Some(email.to_string()),
                display_name: None,
            };
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            user
        };
        self.start_session(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError> {
        let account = lock(&self.accounts)
            .get(email)
            .cloned()
            .ok_or_else(|| ProviderError::new(codes::USER_NOT_FOUND, "no user record"))?;
        if account.password != password {
            return Err(ProviderError::new(codes::WRONG_PASSWORD, "bad password"));
        }
        self.start_session(account.user.clone());
        Ok(account.user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::new(codes::INTERNAL_ERROR, "sign-out failed"));
        }
        self.invalidate();
        Ok(())
    }

    async fn get_token(&self, force_refresh: bool) -> Result<String, ProviderError> {
        Ok(self.get_token_claims(force_refresh).await?.token)
    }

    async fn get_token_claims(&self, force_refresh: bool) -> Result<Credential, ProviderError> {
        let user = self.current().ok_or_else(ProviderError::no_current_user)?;
        let mut cached = lock(&self.cached);
        if force_refresh {
            self.forced.fetch_add(1, Ordering::SeqCst);
        } else if let Some(credential) = cached.as_ref() {
            if !credential.is_expired(Utc::now()) {
                return Ok(credential.clone());
            }
        }
        let credential = self.issue(&user);
        *cached = Some(credential.clone());
        Ok(credential)
    }

    fn subscribe(&self) -> watch::Receiver<Option<ProviderUser>> {
        self.changes.subscribe()
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProviderUser, ProviderError> {
        let mut user = self.current().ok_or_else(ProviderError::no_current_user)?;
        if let Some(name) = &update.display_name {
            user.display_name = Some(name.clone());
        }
        if let Some(email) = user.email.clone() {
            if let Some(account) = lock(&self.accounts).get_mut(&email) {
                account.user = user.clone();
            }
        }
        // Profile edits do not count as a session change.
        self.changes.send_if_modified(|current| {
            *current = Some(user.clone());
            false
        });
        Ok(user)
    }
}

/// Audit sink that records every event.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<NewAuditEvent>>,
    failing: AtomicBool,
}

impl RecordingAuditSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent event.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every event recorded so far.
    pub fn events(&self) -> Vec<NewAuditEvent> {
        lock(&self.events).clone()
    }

    /// The `action` detail of every recorded event.
    pub fn actions(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| e.action().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: NewAuditEvent) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("audit endpoint down"));
        }
        lock(&self.events).push(event);
        Ok(())
    }
}

//! Session lifecycle against a live adapter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};

use docadmin::client::{DocumentsApi, UsersApi};
use docadmin::core::error::ErrorKind;

use crate::helpers::{self, ADMIN_EMAIL, TestConsole};

async fn users(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    helpers::check_bearer(&headers)?;
    Ok(Json(json!([
        {"id": "1", "display_name": "Lucía Pérez", "email": "lucia@muni.gob", "role": "admin", "status": "active"}
    ])))
}

/// Every storage listing is rejected as if the token had been revoked.
async fn revoked() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

fn router() -> Router {
    Router::new()
        .route("/admin/users", get(users))
        .route("/documents/storage", get(revoked))
}

#[tokio::test]
async fn test_login_attaches_credential_to_requests() {
    let console = TestConsole::new(router()).await;
    console.login().await;

    let token = console.client.credential().await.unwrap();
    assert!(token.starts_with("token-"));
    assert_eq!(console.session.credential().await.unwrap().token, token);
    assert!(console.session.is_admin().await);
    assert_eq!(console.session.user_role().await, "admin");
    assert!(console.audit.actions().contains(&"LOGIN".to_string()));

    let listed = UsersApi::new(console.client.clone()).list().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_rejected_credential_ends_session_and_redirects() {
    let console = TestConsole::new(router()).await;
    console.login().await;
    assert!(!console.store.is_empty());

    let err = DocumentsApi::new(console.client.clone())
        .list_storage(None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    assert!(console.client.credential().await.is_none());
    assert_eq!(
        console.navigator.redirects(),
        vec!["/login?reason=session_expired".to_string()]
    );

    let session = console.session.clone();
    assert!(helpers::eventually(|| {
        let session = session.clone();
        async move { !session.is_authenticated().await }
    })
    .await);
    assert!(console.store.is_empty());
}

#[tokio::test]
async fn test_requests_without_session_are_rejected_once_signed_out() {
    let console = TestConsole::new(router()).await;
    console.login().await;
    console.session.logout().await.unwrap();

    assert!(console.client.credential().await.is_none());
    let err = UsersApi::new(console.client.clone()).list().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(console.navigator.redirects().len(), 1);
}

#[tokio::test]
async fn test_failed_login_reports_message_and_audits() {
    let console = TestConsole::new(router()).await;

    let err = console
        .session
        .login(ADMIN_EMAIL, "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Incorrect password");
    assert!(!console.session.is_authenticated().await);
    assert!(console.client.credential().await.is_none());
    assert_eq!(console.audit.actions(), vec!["LOGIN_FAILED".to_string()]);
}

type AcceptedEvents = Arc<Mutex<Vec<String>>>;

/// Audit endpoint that, like the platform API, requires a signed-in caller.
async fn audit_event(
    State(accepted): State<AcceptedEvents>,
    headers: HeaderMap,
    Json(event): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    helpers::check_bearer(&headers)?;
    let action = event["details"]["action"].as_str().unwrap_or_default().to_string();
    accepted.lock().unwrap().push(action);
    Ok(Json(json!({"status": "ok"})))
}

#[tokio::test]
async fn test_failed_login_audit_does_not_end_next_session() {
    let accepted = AcceptedEvents::default();
    let app = Router::new()
        .route("/audit/event", post(audit_event))
        .with_state(accepted.clone())
        .merge(router());
    let console = TestConsole::with_remote_audit(app).await;

    // The LOGIN_FAILED event goes out without a credential and is rejected.
    let err = console
        .session
        .login(ADMIN_EMAIL, "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Incorrect password");

    console.login().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(console.session.is_authenticated().await);
    assert!(console.client.credential().await.is_some());
    let listed = UsersApi::new(console.client.clone()).list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(*accepted.lock().unwrap(), vec!["LOGIN".to_string()]);
}

//! Fetched collections flowing through the view layer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use serde_json::{Value, json};

use docadmin::client::{AuditApi, LibraryApi};
use docadmin::entity::audit::{AuditLogEntry, AuditLogQuery};
use docadmin::entity::library::LibraryEntry;
use docadmin::view::domain::{AuditFacet, LibraryFacet, audit_stats};
use docadmin::view::{DatePreset, DebouncedSearch, SearchState, ViewModel, audit_csv};

use crate::helpers::{self, TestConsole};

async fn audit_logs(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    helpers::check_bearer(&headers)?;
    if params.get("limit").map(String::as_str) != Some("200") {
        return Err(StatusCode::BAD_REQUEST);
    }

    let now = Utc::now();
    let logs: Vec<Value> = (0..200)
        .map(|i| {
            let (event_type, severity) = if i % 28 == 27 {
                ("SECURITY_EVENT", "CRITICAL")
            } else if i % 2 == 0 {
                ("AUTHENTICATION", "INFO")
            } else {
                ("SEARCH", "WARNING")
            };
            json!({
                "timestamp": (now - ChronoDuration::minutes(i * 10))
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                "user_id": format!("uid-{}", i % 3),
                "event_type": event_type,
                "severity": severity,
                "details": {"n": i},
            })
        })
        .collect();
    Ok(Json(json!({"logs": logs, "total_count": 200})))
}

async fn library(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    helpers::check_bearer(&headers)?;
    let q = params.get("q").cloned().unwrap_or_default();
    let hits = if q.is_empty() {
        json!([
            {"name": "plan.pdf", "size": 1000, "type": "pdf"},
            {"name": "acta.docx", "size": 2000, "type": "docx"}
        ])
    } else {
        json!([
            {"name": format!("{q}-informe.pdf"), "size": 3000, "type": "pdf"},
            {"name": format!("{q}-anexo.xlsx"), "size": 4000, "type": "xlsx"}
        ])
    };
    Ok(Json(json!({"hits": hits})))
}

fn router() -> Router {
    Router::new()
        .route("/audit/logs", get(audit_logs))
        .route("/documents/public", get(library))
}

#[tokio::test]
async fn test_audit_view_filters_and_exports_fetched_entries() {
    let console = TestConsole::new(router()).await;
    console.login().await;

    let page = AuditApi::new(console.client.clone())
        .get_logs(&AuditLogQuery::default())
        .await;

    let mut view = ViewModel::<AuditLogEntry>::new("audit");
    assert!(view.apply_fetch(page.map(|p| p.logs)));

    let filter = view.filter_mut();
    filter.select(AuditFacet::EventType, "SECURITY_EVENT");
    filter.select(AuditFacet::Severity, "CRITICAL");
    filter.apply_preset(DatePreset::LastDay, Utc::now());

    let derived = view.derived();
    // Entries 27, 55, 83, 111 and 139 fall inside the last 24 hours.
    assert_eq!(derived.len(), 5);
    let instants: Vec<_> = derived.iter().map(|e| e.occurred_at().unwrap()).collect();
    assert!(instants.windows(2).all(|w| w[0] >= w[1]));

    let stats = audit_stats(&derived);
    assert_eq!(stats.total, 5);

    let csv = audit_csv(&derived);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "Date,User,Event,Severity,Details");
    assert!(lines[1].ends_with(r#",SECURITY_EVENT,CRITICAL,"{""n"":27}""#));
}

#[tokio::test]
async fn test_failed_refetch_keeps_last_good_audit_view() {
    let console = TestConsole::new(router()).await;
    console.login().await;
    let api = AuditApi::new(console.client.clone());

    let mut view = ViewModel::<AuditLogEntry>::new("audit");
    view.apply_fetch(api.get_logs(&AuditLogQuery::default()).await.map(|p| p.logs));
    assert_eq!(view.derived().len(), 200);

    // The server only serves full pages.
    let bad = AuditLogQuery {
        limit: 5,
        ..AuditLogQuery::default()
    };
    assert!(!view.apply_fetch(api.get_logs(&bad).await.map(|p| p.logs)));
    assert_eq!(view.derived().len(), 200);
    assert!(view.notice().is_some());
}

#[tokio::test]
async fn test_library_search_goes_remote_and_back() {
    let console = TestConsole::new(router()).await;
    console.login().await;
    let api = LibraryApi::new(console.client.clone(), 20);

    let mut view = ViewModel::<LibraryEntry>::new("library");
    view.apply_fetch(api.list(docadmin::core::types::PageRequest::first(20)).await);
    assert_eq!(view.derived().len(), 2);

    let search = DebouncedSearch::new(Arc::new(api.clone()), Duration::from_millis(20));
    let mut updates = search.subscribe();
    search.input("presupuesto");
    let results = loop {
        updates.changed().await.unwrap();
        let state = updates.borrow_and_update().clone();
        match state {
            SearchState::Ready { results, .. } => break results,
            SearchState::Failed { message, .. } => panic!("search failed: {message}"),
            _ => {}
        }
    };

    view.filter_mut().set_query("presupuesto");
    view.set_remote_results(Some(results));
    view.filter_mut().select(LibraryFacet::Type, "pdf");
    let names: Vec<String> = view.derived().iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["presupuesto-informe.pdf".to_string()]);

    search.input("");
    assert!(matches!(search.current(), SearchState::Idle));
    view.set_remote_results(None);
    view.filter_mut().set_query("");
    assert_eq!(view.derived().len(), 1);
}

//! Status API tests
//!
//! `create_app`に対して`oneshot`でリクエストを送り、JSONレスポンスを検証する。

use crate::support::pk;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use dmsg_daemon::api::create_app;
use dmsg_daemon::health::{RoundReport, SchedulerState, StatusStore};
use dmsg_daemon::AppState;
use dmsg_daemon_common::types::{PeerStatus, RoundResult};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn sample_report() -> RoundReport {
    let now = Utc::now();
    RoundReport {
        round_id: Uuid::new_v4(),
        started_at: now,
        finished_at: now,
        peers: RoundResult::from(vec![PeerStatus::online(pk(1)), PeerStatus::offline(pk(2))]),
    }
}

#[tokio::test]
async fn health_reports_process_liveness() {
    let status = StatusStore::new();
    let app = create_app(AppState::new(status));

    for uri in ["/", "/health"] {
        let (code, body) = get_json(app.clone(), uri).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["scheduler_state"], "idle");
        assert_eq!(body["rounds_completed"], 0);
        assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
    }
}

#[tokio::test]
async fn peers_is_empty_before_first_round() {
    let app = create_app(AppState::new(StatusStore::new()));

    let (code, body) = get_json(app, "/peers").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn peers_returns_latest_round_in_list_order() {
    let status = StatusStore::new();
    let app = create_app(AppState::new(status.clone()));

    status.publish_round(sample_report());
    let (code, body) = get_json(app, "/peers").await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            { "identity": pk(1).to_string(), "online": true },
            { "identity": pk(2).to_string(), "online": false },
        ])
    );
}

#[tokio::test]
async fn status_includes_scheduler_state_and_last_round() {
    let status = StatusStore::new();
    let app = create_app(AppState::new(status.clone()));

    let report = sample_report();
    let round_id = report.round_id;
    status.publish_round(report);
    status.set_state(SchedulerState::Running);

    let (code, body) = get_json(app.clone(), "/status").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["state"], "running");
    assert_eq!(body["rounds_completed"], 1);
    assert_eq!(body["last_round"]["round_id"], round_id.to_string());
    assert_eq!(body["last_round"]["peers"].as_array().unwrap().len(), 2);

    let (_, health) = get_json(app, "/health").await;
    assert_eq!(health["scheduler_state"], "running");
    assert_eq!(health["rounds_completed"], 1);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = create_app(AppState::new(StatusStore::new()));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

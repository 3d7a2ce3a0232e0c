//! GET / および GET /health
//!
//! デーモンプロセス自体の生存確認。個々のピアの状態は含まない。

use crate::health::SchedulerState;
use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// ヘルスチェックレスポンス
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 常に"ok"
    pub status: &'static str,
    /// デーモンのバージョン
    pub version: &'static str,
    /// 起動時刻
    pub started_at: DateTime<Utc>,
    /// 稼働秒数
    pub uptime_secs: i64,
    /// スケジューラーの状態
    pub scheduler_state: SchedulerState,
    /// 完了したラウンド数
    pub rounds_completed: u64,
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.status.snapshot();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds().max(0),
        scheduler_state: snapshot.state,
        rounds_completed: snapshot.rounds_completed,
    })
}

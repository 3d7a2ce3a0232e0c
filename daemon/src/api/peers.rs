//! GET /peers および GET /status
//!
//! 直近ラウンドの結果をピアリスト順で返す。

use crate::health::StatusSnapshot;
use crate::AppState;
use axum::{extract::State, Json};
use dmsg_daemon_common::types::RoundResult;

/// GET /peers - `[{"identity": ..., "online": ...}, ...]`
///
/// 最初のラウンドが終わるまでは空配列。
pub async fn list_peers(State(state): State<AppState>) -> Json<RoundResult> {
    let peers = state
        .status
        .last_round()
        .map(|report| report.peers.clone())
        .unwrap_or_default();
    Json(peers)
}

/// GET /status - スケジューラーの状態と直近ラウンドのレポート
pub async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.status.snapshot())
}

//! REST APIハンドラー
//!
//! プロセスのヘルスチェックと直近ラウンドの結果

pub mod health;
pub mod peers;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::get_health))
        .route("/health", get(health::get_health))
        .route("/peers", get(peers::list_peers))
        .route("/status", get(peers::get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

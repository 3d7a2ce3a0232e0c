//! dmsg daemon
//!
//! dmsgネットワーク上のピアへ定期的に接続を試み、到達性を監視するデーモン

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// デーモン起動ロジック
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// エラー型定義
pub mod error;

/// ピア到達性モニター（プローブ・ファンアウト・スケジューラー）
pub mod health;

/// ロギング初期化
pub mod logging;

/// オーバーレイネットワーククライアント
pub mod overlay;

/// ピアリストソース
pub mod peers;

/// axumサーバー起動
pub mod server;

/// Shutdown controller
pub mod shutdown;

use chrono::{DateTime, Utc};

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 直近ラウンドの状態ストア
    pub status: health::StatusStore,
    /// デーモンの起動時刻
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 現在時刻を起動時刻とする状態を作成
    pub fn new(status: health::StatusStore) -> Self {
        Self {
            status,
            started_at: Utc::now(),
        }
    }
}

//! 直近ラウンドの状態ストア
//!
//! スケジューラーが書き込み、HTTP APIが読み取る。ラウンド結果は
//! 毎回置き換えられ、履歴は保持しない。

use chrono::{DateTime, Utc};
use dmsg_daemon_common::types::RoundResult;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// スケジューラーの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// 次のティック待ち
    #[default]
    Idle,
    /// ラウンド実行中
    Running,
    /// キャンセル済み
    Cancelled,
}

impl SchedulerState {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
        }
    }
}

/// 完了したラウンドのレポート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// ラウンドID
    pub round_id: Uuid,
    /// 開始時刻
    pub started_at: DateTime<Utc>,
    /// 完了時刻
    pub finished_at: DateTime<Utc>,
    /// ピアごとの結果（ピアリスト順）
    pub peers: RoundResult,
}

impl RoundReport {
    /// オンラインのピア数
    pub fn online_count(&self) -> usize {
        self.peers.online_count()
    }

    /// オフラインのピア数
    pub fn offline_count(&self) -> usize {
        self.peers.offline_count()
    }
}

/// ある時点の状態
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    /// スケジューラーの状態
    pub state: SchedulerState,
    /// 完了したラウンド数
    pub rounds_completed: u64,
    /// 直近のラウンド
    pub last_round: Option<Arc<RoundReport>>,
}

/// 状態ストア
#[derive(Clone)]
pub struct StatusStore {
    tx: Arc<watch::Sender<StatusSnapshot>>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// スケジューラーの状態を更新
    pub fn set_state(&self, state: SchedulerState) {
        self.tx.send_modify(|snapshot| snapshot.state = state);
    }

    /// ラウンド結果を公開する（前回の結果を置き換える）
    pub fn publish_round(&self, report: RoundReport) {
        self.tx.send_modify(|snapshot| {
            snapshot.rounds_completed += 1;
            snapshot.last_round = Some(Arc::new(report));
        });
    }

    /// 現在の状態
    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    /// 直近のラウンド
    pub fn last_round(&self) -> Option<Arc<RoundReport>> {
        self.tx.borrow().last_round.clone()
    }

    /// 変更通知を購読する
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }
}

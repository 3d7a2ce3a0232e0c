//! ラウンドスケジューラー
//!
//! 一定間隔でラウンドを1つずつ実行する。ラウンドK+1はラウンドKの完了後にのみ始まる。
//! 致命的な状況は`SchedulerExit`として呼び出し元に返し、プロセスの終了判断は
//! `main`に委ねる。

use super::round::RoundCoordinator;
use super::status::{RoundReport, SchedulerState, StatusStore};
use crate::error::{ClientInitError, LoadError, RoundError};
use crate::peers::PeerSource;
use crate::shutdown::ShutdownController;
use chrono::Utc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// デフォルトのラウンド間隔（秒）
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// スケジューラーの終了理由
#[derive(Debug)]
pub enum SchedulerExit {
    /// シャットダウンが要求された
    Cancelled,
    /// ラウンド用のクライアントを作成できなかった
    ClientInit(ClientInitError),
    /// ピアリストを一度も読み込めなかった
    PeerLoad(LoadError),
}

/// ラウンドスケジューラー
pub struct RoundScheduler {
    peers: PeerSource,
    coordinator: RoundCoordinator,
    interval: Duration,
    status: StatusStore,
    shutdown: ShutdownController,
}

impl RoundScheduler {
    /// 新しいスケジューラーを作成
    pub fn new(
        peers: PeerSource,
        coordinator: RoundCoordinator,
        status: StatusStore,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            peers,
            coordinator,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            status,
            shutdown,
        }
    }

    /// ラウンド間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// スケジューラーループ
    ///
    /// 最初のティックは即座に発火するため、起動直後に1ラウンド目が走る。
    pub async fn run(mut self) -> SchedulerExit {
        let mut timer = interval(self.interval);
        // 長引いたラウンドの後に溜まったティックをまとめて消化しない
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.interval.as_secs(),
            "Round scheduler started"
        );

        loop {
            self.status.set_state(SchedulerState::Idle);

            tokio::select! {
                biased;
                _ = self.shutdown.wait() => return self.cancelled(),
                _ = timer.tick() => {}
            }

            if let Err(exit) = self.run_round().await {
                if !matches!(exit, SchedulerExit::Cancelled) {
                    self.status.set_state(SchedulerState::Idle);
                }
                return exit;
            }
        }
    }

    /// 1ティック分のラウンドを実行し、結果を公開する
    pub async fn run_round(&mut self) -> Result<RoundReport, SchedulerExit> {
        let targets = self
            .peers
            .targets_for_round()
            .map_err(SchedulerExit::PeerLoad)?;

        self.status.set_state(SchedulerState::Running);

        let round_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("round", %round_id);

        let result = self
            .coordinator
            .run_round(&targets, &self.shutdown)
            .instrument(span)
            .await
            .map_err(|e| match e {
                RoundError::ClientInit(e) => SchedulerExit::ClientInit(e),
            })?;

        // キャンセルで打ち切られたラウンドの結果は公開しない
        if self.shutdown.is_shutdown_requested() {
            return Err(self.cancelled());
        }

        let report = RoundReport {
            round_id,
            started_at,
            finished_at: Utc::now(),
            peers: result,
        };
        self.status.publish_round(report.clone());
        Ok(report)
    }

    fn cancelled(&self) -> SchedulerExit {
        self.status.set_state(SchedulerState::Cancelled);
        info!("Round scheduler cancelled");
        SchedulerExit::Cancelled
    }
}

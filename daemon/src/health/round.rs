//! ラウンドのファンアウト実行
//!
//! 1ラウンドにつきクライアントを1つ作成し、ターゲットごとに1タスクを起動して
//! 全タスクの完了を待つ。結果の順序は常に入力の順序と一致する。

use super::probe::Prober;
use crate::error::RoundError;
use crate::overlay::OverlayProvider;
use crate::shutdown::ShutdownController;
use dmsg_daemon_common::types::{PeerStatus, PeerTarget, RoundResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn, Instrument};

/// ファンアウトコーディネーター
#[derive(Clone)]
pub struct RoundCoordinator {
    provider: Arc<dyn OverlayProvider>,
    prober: Prober,
    max_concurrency: Option<usize>,
}

impl RoundCoordinator {
    /// 新しいコーディネーターを作成（同時実行数は無制限）
    pub fn new(provider: Arc<dyn OverlayProvider>, prober: Prober) -> Self {
        Self {
            provider,
            prober,
            max_concurrency: None,
        }
    }

    /// 同時ダイヤル数の上限を設定
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.map(|n| n.max(1));
        self
    }

    /// 1ラウンドを実行する
    ///
    /// クライアントの作成に失敗した場合のみエラーになる。個々のピアの失敗は
    /// `online: false`として結果に含まれる。
    pub async fn run_round(
        &self,
        targets: &[PeerTarget],
        shutdown: &ShutdownController,
    ) -> Result<RoundResult, RoundError> {
        if targets.is_empty() {
            info!("No peers to probe");
            return Ok(RoundResult::default());
        }

        let start = Instant::now();
        let client = self.provider.new_client().await?;
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

        let mut handles = Vec::with_capacity(targets.len());
        for target in targets.iter().copied() {
            let client = Arc::clone(&client);
            let prober = self.prober;
            let shutdown = shutdown.clone();
            let limiter = limiter.clone();

            let task = async move {
                let _permit = match limiter {
                    Some(limiter) => tokio::select! {
                        biased;
                        _ = shutdown.wait() => return PeerStatus::offline(target.identity),
                        permit = limiter.acquire_owned() => match permit {
                            Ok(permit) => Some(permit),
                            Err(_) => return PeerStatus::offline(target.identity),
                        },
                    },
                    None => None,
                };
                prober.probe(client.as_ref(), &target, &shutdown).await
            };
            handles.push(tokio::spawn(task.in_current_span()));
        }

        // i番目のハンドルの結果だけがi番目のスロットになる
        let mut statuses = Vec::with_capacity(targets.len());
        for (target, handle) in targets.iter().zip(handles) {
            match handle.await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    error!(peer = %target, error = %e, "Probe task join error");
                    statuses.push(PeerStatus::offline(target.identity));
                }
            }
        }

        if let Err(e) = client.close().await {
            warn!(client = %client.identity(), error = %e, "Failed to close overlay client");
        }

        let result = RoundResult::from(statuses);
        info!(
            peers = result.len(),
            online = result.online_count(),
            offline = result.offline_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Probe round completed"
        );

        Ok(result)
    }
}

//! プローブ実行
//!
//! 1ピアに対して接続→切断を1回だけ試み、結果を真偽値に変換する。
//! リトライはしない（次のラウンドで自然に再試行される）。

use crate::error::DialError;
use crate::overlay::{OverlayClient, Session};
use crate::shutdown::ShutdownController;
use dmsg_daemon_common::types::{PeerStatus, PeerTarget};
use std::time::Duration;
use tracing::{debug, warn};

/// デフォルトのダイヤルタイムアウト（秒）
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 10;

/// プローブ実行器
#[derive(Debug, Clone, Copy)]
pub struct Prober {
    dial_timeout: Duration,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS))
    }
}

impl Prober {
    /// 新しいプローブ実行器を作成
    pub fn new(dial_timeout: Duration) -> Self {
        Self { dial_timeout }
    }

    /// ダイヤルタイムアウト
    pub fn dial_timeout(&self) -> Duration {
        self.dial_timeout
    }

    /// 1ピアをプローブする
    ///
    /// 接続に失敗したら`online: false`（切断は試みない）。
    /// 接続に成功したら切断の成否にかかわらず`online: true`。
    pub async fn probe(
        &self,
        client: &dyn OverlayClient,
        target: &PeerTarget,
        shutdown: &ShutdownController,
    ) -> PeerStatus {
        let session = match self.dial(client, target, shutdown).await {
            Ok(session) => session,
            Err(e) => {
                debug!(peer = %target, error = %e, "Peer offline");
                return PeerStatus::offline(target.identity);
            }
        };

        if let Err(e) = session.close().await {
            warn!(peer = %target, error = %e, "Failed to close session");
        }

        debug!(peer = %target, "Peer online");
        PeerStatus::online(target.identity)
    }

    /// タイムアウトとキャンセルを考慮してダイヤルする
    async fn dial(
        &self,
        client: &dyn OverlayClient,
        target: &PeerTarget,
        shutdown: &ShutdownController,
    ) -> Result<Box<dyn Session>, DialError> {
        tokio::select! {
            biased;
            _ = shutdown.wait() => Err(DialError::Cancelled),
            result = tokio::time::timeout(self.dial_timeout, client.connect(target)) => {
                result.map_err(|_| DialError::Timeout(self.dial_timeout))?
            }
        }
    }
}

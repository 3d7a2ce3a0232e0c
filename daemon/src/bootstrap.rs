//! デーモン起動ロジック
//!
//! 設定からステータスAPI・ラウンドコーディネーター・スケジューラーを組み立て、
//! スケジューラーが終了するまで実行する。終了コードの決定もここで行う。

use crate::health::{Prober, RoundCoordinator, RoundScheduler, SchedulerExit, StatusStore};
use crate::overlay::DiscoveryProvider;
use crate::peers::{PeerListSource, PeerSource};
use crate::shutdown::ShutdownController;
use crate::{server, AppState};
use anyhow::Context;
use dmsg_daemon_common::config::DaemonConfig;
use std::sync::Arc;
use tracing::{error, info};

/// シグナルによる終了
pub const EXIT_SIGNAL: u8 = 1;
/// ラウンドを実行できない設定・環境による終了
pub const EXIT_FATAL: u8 = 2;

/// ステータスAPIとスケジューラーを起動し、スケジューラーの終了まで待つ
///
/// ステータスAPIが起動できなかった・異常終了した場合は、スケジューラーの
/// 終了理由にかかわらずエラーを返す。
pub async fn run(
    config: DaemonConfig,
    shutdown: ShutdownController,
) -> anyhow::Result<SchedulerExit> {
    let status = StatusStore::new();
    let state = AppState::new(status.clone());

    let bind_addr = config.bind_addr();
    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = server::run(state, &bind_addr, shutdown.clone()).await;
            if let Err(e) = &result {
                error!(addr = %bind_addr, error = %e, "serve failed");
                shutdown.request_shutdown();
            }
            result.with_context(|| format!("status API on {bind_addr} failed"))
        })
    };

    let provider = Arc::new(DiscoveryProvider::new(
        config.discovery_url.clone(),
        config.dial_timeout(),
    ));
    let coordinator = RoundCoordinator::new(provider, Prober::new(config.dial_timeout()))
        .with_max_concurrency(config.max_concurrency);
    let peers = PeerSource::new(PeerListSource::from_config(&config));

    info!(
        interval_secs = config.interval_secs,
        discovery = %config.discovery_url,
        source = ?peers.source(),
        "Starting probe rounds"
    );

    let exit = RoundScheduler::new(peers, coordinator, status, shutdown.clone())
        .with_interval(config.interval())
        .run()
        .await;

    shutdown.request_shutdown();
    server.await.context("status API task panicked")??;

    Ok(exit)
}

/// 実行結果をプロセスの終了コードに変換する
pub fn exit_status(outcome: &anyhow::Result<SchedulerExit>) -> u8 {
    match outcome {
        Ok(SchedulerExit::Cancelled) => EXIT_SIGNAL,
        Ok(SchedulerExit::ClientInit(_)) | Ok(SchedulerExit::PeerLoad(_)) | Err(_) => EXIT_FATAL,
    }
}

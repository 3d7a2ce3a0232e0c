//! ロギング初期化
//!
//! `DMSG_DAEMON_LOG_LEVEL`（旧: `LOG_LEVEL`）でフィルタを指定し、
//! `DMSG_DAEMON_LOG_DIR`（旧: `LOG_DIR`）が設定されていれば日次ローテーションのファイルにも出力する。

use crate::config::{get_env_with_fallback, get_env_with_fallback_or};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "dmsg-daemon.log";

/// tracingサブスクライバーを初期化する
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = get_env_with_fallback_or("DMSG_DAEMON_LOG_LEVEL", "LOG_LEVEL", "info");
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = get_env_with_fallback("DMSG_DAEMON_LOG_DIR", "LOG_DIR").map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        fmt::layer().with_ansi(false).with_writer(appender)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(())
}

//! エラー型定義
//!
//! ピアリスト読み込み・オーバーレイ接続・ラウンド実行のエラー（thiserror使用）

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Peer list could not be read
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be opened or read
    #[error("csv error: {path}: {source}")]
    Io {
        /// Peer list path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reader failed before any record could be parsed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Overlay client could not be constructed for a round
#[derive(Debug, Error)]
pub enum ClientInitError {
    /// Discovery URL is not a valid absolute http(s) URL
    #[error("invalid discovery url {url:?}: {reason}")]
    InvalidDiscoveryUrl {
        /// Configured URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client construction failed
    #[error("failed to build discovery http client: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other adapter-specific failure
    #[error("client init failed: {0}")]
    Other(String),
}

/// Dial attempt against one peer failed
#[derive(Debug, Error)]
pub enum DialError {
    /// Dial did not complete within the timeout
    #[error("dial timed out after {0:?}")]
    Timeout(Duration),

    /// Shutdown was requested while dialing
    #[error("dial cancelled")]
    Cancelled,

    /// Client was already closed
    #[error("client is closed")]
    ClientClosed,

    /// Peer has no discovery entry
    #[error("peer is not registered in discovery")]
    NotRegistered,

    /// Peer entry lists no delegated servers
    #[error("peer has no delegated servers")]
    NoDelegatedServers,

    /// Discovery request failed
    #[error("discovery error: {0}")]
    Discovery(String),

    /// No delegated server accepted a connection
    #[error("peer unreachable: {0}")]
    Unreachable(String),
}

/// Session or client teardown failed
#[derive(Debug, Error)]
pub enum CloseError {
    /// Transport shutdown failed
    #[error("close error: {0}")]
    Io(#[from] std::io::Error),

    /// Close was called twice
    #[error("already closed")]
    AlreadyClosed,
}

/// A round could not run at all
#[derive(Debug, Error)]
pub enum RoundError {
    /// No client means no probes
    #[error(transparent)]
    ClientInit(#[from] ClientInitError),
}

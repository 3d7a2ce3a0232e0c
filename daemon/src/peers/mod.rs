//! ピアリストソース
//!
//! 静的リストまたはCSVファイルからプローブ対象を供給する。
//! ラウンドごとに新しい`Vec`を構築し、前回の結果に追記することはない。

pub mod list;

pub use list::{load_peer_targets, parse_peer_targets};

use crate::error::LoadError;
use dmsg_daemon_common::config::{DaemonConfig, ReloadPolicy};
use dmsg_daemon_common::types::PeerTarget;
use std::path::PathBuf;
use tracing::{error, warn};

/// ピアリストの取得元
#[derive(Debug, Clone)]
pub enum PeerListSource {
    /// 起動時に与えられた固定リスト
    Static(Vec<PeerTarget>),
    /// CSVファイル
    Csv {
        /// ファイルパス
        path: PathBuf,
        /// 再読み込みポリシー
        reload: ReloadPolicy,
    },
}

impl PeerListSource {
    /// 設定からソースを決定する
    ///
    /// `peers`が空でなければ静的リスト、空ならCSVファイル。
    /// 静的リストの不正なエントリはエラーログを出してスキップする。
    pub fn from_config(config: &DaemonConfig) -> Self {
        if config.peers.is_empty() {
            return Self::Csv {
                path: PathBuf::from(&config.csv_path),
                reload: config.reload_peers,
            };
        }

        let targets = config
            .peers
            .iter()
            .filter_map(|raw| match raw.parse::<PeerTarget>() {
                Ok(target) => Some(target),
                Err(e) => {
                    error!(peer = %raw, error = %e, "Skipping invalid peer");
                    None
                }
            })
            .collect();
        Self::Static(targets)
    }
}

/// ラウンドごとのピアリストを供給する
#[derive(Debug)]
pub struct PeerSource {
    source: PeerListSource,
    last_good: Option<Vec<PeerTarget>>,
}

impl PeerSource {
    /// 新しいソースを作成
    pub fn new(source: PeerListSource) -> Self {
        Self {
            source,
            last_good: None,
        }
    }

    /// 取得元
    pub fn source(&self) -> &PeerListSource {
        &self.source
    }

    /// 次のラウンドで使うターゲット列を返す
    ///
    /// 読み込みに失敗した場合、過去に成功した読み込みがあればそれを再利用する。
    /// 一度も成功していなければ`LoadError`を返す。
    pub fn targets_for_round(&mut self) -> Result<Vec<PeerTarget>, LoadError> {
        let (path, reload) = match &self.source {
            PeerListSource::Static(targets) => return Ok(targets.clone()),
            PeerListSource::Csv { path, reload } => (path, *reload),
        };

        if reload == ReloadPolicy::Once {
            if let Some(targets) = &self.last_good {
                return Ok(targets.clone());
            }
        }

        match load_peer_targets(path) {
            Ok(targets) => {
                self.last_good = Some(targets.clone());
                Ok(targets)
            }
            Err(e) => match &self.last_good {
                Some(previous) => {
                    warn!(
                        error = %e,
                        count = previous.len(),
                        "Failed to reload peer list, reusing previous list"
                    );
                    Ok(previous.clone())
                }
                None => Err(e),
            },
        }
    }
}

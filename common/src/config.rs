//! 設定管理
//!
//! DaemonConfig（設定ファイル + デフォルト値）

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 設定ファイルの読み込み・デシリアライズ失敗
    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    /// 値の検証失敗
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// ピアリストの再読み込みポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// 起動時に一度だけ読み込む
    Once,
    /// ラウンドごとに読み直す（再起動なしで編集を反映）
    #[default]
    EveryRound,
}

/// デーモン設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// ステータスAPIのホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ステータスAPIのポート番号 (デフォルト: 9090)
    #[serde(default = "default_port")]
    pub port: u16,

    /// ピアリストCSVのパス (デフォルト: "dmsg-clients.csv")
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// 静的ピアリスト（`<pk>` または `<pk>:<port>`）。空でなければCSVより優先
    #[serde(default)]
    pub peers: Vec<String>,

    /// CSVの再読み込みポリシー (デフォルト: every_round)
    #[serde(default)]
    pub reload_peers: ReloadPolicy,

    /// ラウンド間隔（秒）(デフォルト: 60)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// ダイヤルタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_dial_timeout")]
    pub dial_timeout_secs: u64,

    /// ディスカバリサービスのURL
    #[serde(default = "default_discovery_url")]
    pub discovery_url: String,

    /// 同時ダイヤル数の上限（未指定なら無制限）
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_csv_path() -> String {
    "dmsg-clients.csv".to_string()
}

fn default_interval() -> u64 {
    60
}

fn default_dial_timeout() -> u64 {
    10
}

fn default_discovery_url() -> String {
    "http://dmsgd.skywire.skycoin.com".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            csv_path: default_csv_path(),
            peers: Vec::new(),
            reload_peers: ReloadPolicy::default(),
            interval_secs: default_interval(),
            dial_timeout_secs: default_dial_timeout(),
            discovery_url: default_discovery_url(),
            max_concurrency: None,
        }
    }
}

impl DaemonConfig {
    /// 設定ファイル（JSON/TOML/YAML、拡張子で判別）を読み込む
    ///
    /// ファイルに無い項目はデフォルト値になる。
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(config)
    }

    /// 値を検証する
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.dial_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "dial_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.discovery_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "discovery_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ラウンド間隔
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// ダイヤルタイムアウト
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }
}

//! 通信プロトコル定義
//!
//! dmsgディスカバリサービスのエントリ（`GET /dmsg-discovery/entry/{pk}`）

use crate::types::PubKey;
use serde::{Deserialize, Serialize};

/// ディスカバリエントリのパス
pub const ENTRY_PATH: &str = "/dmsg-discovery/entry";

/// ディスカバリに登録されたエントリ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryEntry {
    /// エントリのバージョン
    #[serde(default)]
    pub version: String,
    /// シーケンス番号
    #[serde(default)]
    pub sequence: u64,
    /// 登録時刻（UNIXナノ秒）
    #[serde(default)]
    pub timestamp: i64,
    /// エントリの所有者
    #[serde(rename = "static")]
    pub static_pk: PubKey,
    /// クライアント情報（クライアントとして登録されている場合）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientEntry>,
    /// サーバー情報（サーバーとして登録されている場合）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerEntry>,
}

impl DiscoveryEntry {
    /// 委譲サーバー一覧（未登録なら空）
    pub fn delegated_servers(&self) -> &[PubKey] {
        self.client
            .as_ref()
            .and_then(|c| c.delegated_servers.as_deref())
            .unwrap_or(&[])
    }

    /// サーバーアドレス（サーバーでなければNone）
    pub fn server_address(&self) -> Option<&str> {
        self.server
            .as_ref()
            .map(|s| s.address.as_str())
            .filter(|addr| !addr.is_empty())
    }
}

/// クライアントエントリ
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientEntry {
    /// クライアントが接続している委譲サーバー
    #[serde(default)]
    pub delegated_servers: Option<Vec<PubKey>>,
}

/// サーバーエントリ
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    /// TCPアドレス（`host:port`）
    #[serde(default)]
    pub address: String,
    /// 受け入れ可能なセッション数
    #[serde(rename = "availableSessions", default)]
    pub available_sessions: i64,
}

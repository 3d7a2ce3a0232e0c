//! 共通型定義
//!
//! PubKey, PeerTarget, PeerStatus, RoundResult等のコアデータ型

use crate::error::{PeerParseError, PubKeyError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 公開鍵のバイト長（圧縮形式）
pub const PUB_KEY_LEN: usize = 33;

/// オーバーレイネットワーク上のピア識別子
///
/// 圧縮形式の公開鍵（先頭バイト `0x02` / `0x03`）。正準表現は66文字のhex。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PubKey([u8; PUB_KEY_LEN]);

impl PubKey {
    /// バイト列から公開鍵を作成する
    pub fn from_bytes(bytes: [u8; PUB_KEY_LEN]) -> Result<Self, PubKeyError> {
        if bytes.iter().all(|b| *b == 0) {
            return Err(PubKeyError::Null);
        }
        match bytes[0] {
            0x02 | 0x03 => Ok(Self(bytes)),
            other => Err(PubKeyError::InvalidPrefix(other)),
        }
    }

    /// 圧縮形式の接頭辞（`odd`なら`0x03`）とX座標から公開鍵を作成する
    pub fn from_compressed(odd: bool, x: [u8; PUB_KEY_LEN - 1]) -> Self {
        let mut bytes = [0u8; PUB_KEY_LEN];
        bytes[0] = if odd { 0x03 } else { 0x02 };
        bytes[1..].copy_from_slice(&x);
        Self(bytes)
    }

    /// 生バイト列
    pub fn as_bytes(&self) -> &[u8; PUB_KEY_LEN] {
        &self.0
    }

    /// 小文字hex表現
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for PubKey {
    type Err = PubKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != PUB_KEY_LEN * 2 {
            return Err(PubKeyError::InvalidLength {
                expected: PUB_KEY_LEN * 2,
                actual: s.len(),
            });
        }
        let mut bytes = [0u8; PUB_KEY_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| PubKeyError::InvalidHex(e.to_string()))?;
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({})", self.to_hex())
    }
}

impl Serialize for PubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// プローブ対象のピア
///
/// `port == 0` はポート未指定（ルーター側で選択）を表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerTarget {
    /// ピアの公開鍵
    pub identity: PubKey,
    /// 論理ポート
    #[serde(default)]
    pub port: u16,
}

impl PeerTarget {
    /// 新しいターゲットを作成
    pub fn new(identity: PubKey, port: u16) -> Self {
        Self { identity, port }
    }

    /// 公開鍵文字列と任意のポート文字列からターゲットを作成する
    ///
    /// ポートが空または未指定の場合は0になる。
    pub fn from_fields(identity: &str, port: Option<&str>) -> Result<Self, PeerParseError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(PeerParseError::MissingIdentity);
        }
        let identity: PubKey = identity.parse()?;

        let port = match port.map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| PeerParseError::Port(raw.to_string()))?,
        };

        Ok(Self { identity, port })
    }
}

impl FromStr for PeerTarget {
    type Err = PeerParseError;

    /// `<pk>` または `<pk>:<port>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((pk, port)) => Self::from_fields(pk, Some(port)),
            None => Self::from_fields(s, None),
        }
    }
}

impl fmt::Display for PeerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identity, self.port)
    }
}

/// 1ラウンドにおける1ピアの到達性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerStatus {
    /// ピアの公開鍵
    pub identity: PubKey,
    /// 接続に成功したか
    pub online: bool,
}

impl PeerStatus {
    /// オンライン状態
    pub fn online(identity: PubKey) -> Self {
        Self {
            identity,
            online: true,
        }
    }

    /// オフライン状態
    pub fn offline(identity: PubKey) -> Self {
        Self {
            identity,
            online: false,
        }
    }
}

/// 1ラウンドの結果
///
/// ラウンド開始時のターゲット列と同じ長さ・同じ順序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundResult(Vec<PeerStatus>);

impl RoundResult {
    /// ステータス数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ステータス一覧
    pub fn statuses(&self) -> &[PeerStatus] {
        &self.0
    }

    /// オンラインのピア数
    pub fn online_count(&self) -> usize {
        self.0.iter().filter(|s| s.online).count()
    }

    /// オフラインのピア数
    pub fn offline_count(&self) -> usize {
        self.len() - self.online_count()
    }
}

impl From<Vec<PeerStatus>> for RoundResult {
    fn from(statuses: Vec<PeerStatus>) -> Self {
        Self(statuses)
    }
}

impl FromIterator<PeerStatus> for RoundResult {
    fn from_iter<I: IntoIterator<Item = PeerStatus>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

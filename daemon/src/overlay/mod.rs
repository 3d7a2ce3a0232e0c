//! オーバーレイネットワーククライアントの抽象
//!
//! プローブはこのトレイト越しにのみ接続を行う。実装は
//! ディスカバリサービスを使う[`discovery::DiscoveryProvider`]のみで、
//! テストでは決定的に成功・失敗する偽実装に差し替える。

pub mod discovery;

pub use discovery::DiscoveryProvider;

use crate::error::{ClientInitError, CloseError, DialError};
use async_trait::async_trait;
use dmsg_daemon_common::types::{PubKey, PeerTarget, PUB_KEY_LEN};
use std::sync::Arc;

/// ラウンドごとにクライアントを供給する
#[async_trait]
pub trait OverlayProvider: Send + Sync {
    /// 新しいエフェメラルIDを持つクライアントを作成する
    async fn new_client(&self) -> Result<Arc<dyn OverlayClient>, ClientInitError>;
}

/// 1ラウンドの間、全プローブで共有されるクライアント
///
/// 並行な`connect`呼び出しに必要な排他は実装側の責務。
#[async_trait]
pub trait OverlayClient: Send + Sync {
    /// このクライアントのエフェメラルID
    fn identity(&self) -> PubKey;

    /// ピアへの接続を確立する
    async fn connect(&self, target: &PeerTarget) -> Result<Box<dyn Session>, DialError>;

    /// クライアントを閉じる
    async fn close(&self) -> Result<(), CloseError>;
}

/// 確立済みの接続
#[async_trait]
pub trait Session: Send {
    /// 接続先
    fn target(&self) -> &PeerTarget;

    /// 接続を閉じる
    async fn close(self: Box<Self>) -> Result<(), CloseError>;
}

/// ランダムなエフェメラル公開鍵を生成する
pub fn ephemeral_identity() -> PubKey {
    let x: [u8; PUB_KEY_LEN - 1] = rand::random();
    PubKey::from_compressed(rand::random(), x)
}

//! 統合テスト用の共通ヘルパー

#![allow(dead_code)]


use dmsg_daemon_common::types::{PeerTarget, PubKey};

/// テスト用の決定的なピアを作る（`n`ごとに異なる公開鍵）
pub fn peer(n: u8) -> PeerTarget {
    PeerTarget::new(PubKey::from_compressed(n % 2 == 1, [n; 32]), 0)
}

/// `peer(n)`の公開鍵
pub fn pk(n: u8) -> PubKey {
    peer(n).identity
}

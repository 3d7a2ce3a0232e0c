//! dmsg-daemon 共通ライブラリ
//!
//! デーモン本体とテストで共有するデータ型・設定・ディスカバリのワイヤ型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// ディスカバリサービスとのワイヤ型
pub mod protocol;

/// 共通型定義
pub mod types;

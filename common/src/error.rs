//! エラー型定義
//!
//! 公開鍵とピアレコードのパースエラー（thiserror使用）

use thiserror::Error;

/// Public key parse error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PubKeyError {
    /// Wrong number of hex characters
    #[error("public key must be {expected} hex characters, got {actual}")]
    InvalidLength {
        /// Expected length in hex characters
        expected: usize,
        /// Actual length in hex characters
        actual: usize,
    },

    /// Input contained non-hex characters
    #[error("public key is not valid hex: {0}")]
    InvalidHex(String),

    /// First byte is not a compressed-point prefix
    #[error("public key has invalid prefix byte 0x{0:02x}")]
    InvalidPrefix(u8),

    /// All-zero key
    #[error("public key is null")]
    Null,
}

/// Per-record peer parse error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerParseError {
    /// Record had no identity column
    #[error("missing public key")]
    MissingIdentity,

    /// Identity column could not be parsed
    #[error("pk error: {0}")]
    Identity(#[from] PubKeyError),

    /// Port column could not be parsed
    #[error("port error: invalid port {0:?}")]
    Port(String),
}

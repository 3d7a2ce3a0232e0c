//! ロギング用の環境変数
//!
//! CLIフラグの環境変数（`DMSG_DAEMON_PORT`など）はclapが直接読む。
//! このモジュールはCLIより先に評価されるロギング設定だけを扱う:
//!
//! | 変数 | 旧名 | 用途 |
//! |------|------|------|
//! | `DMSG_DAEMON_LOG_LEVEL` | `LOG_LEVEL` | `EnvFilter`のディレクティブ |
//! | `DMSG_DAEMON_LOG_DIR` | `LOG_DIR` | 日次ローテーションのログ出力先 |
//!
//! 旧名だけが設定されている場合は警告を出してその値を使う。

/// `new_name`を優先し、無ければ旧名`old_name`を読む
///
/// # Example
/// ```
/// use dmsg_daemon::config::get_env_with_fallback;
///
/// let level = get_env_with_fallback("DMSG_DAEMON_LOG_LEVEL", "LOG_LEVEL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            deprecated = old_name,
            replacement = new_name,
            "Deprecated logging environment variable in use"
        );
        return Some(val);
    }
    None
}

/// どちらも未設定なら`default`
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

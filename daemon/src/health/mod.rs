//! ピア到達性モニター
//!
//! 定期的に全ピアへ接続→切断を試み、ラウンドごとの結果を状態ストアに公開する。
//!
//! - [`probe`]: 1ピアのプローブ
//! - [`round`]: 1ラウンドのファンアウト
//! - [`scheduler`]: ラウンドの定期実行
//! - [`status`]: 直近ラウンドの状態

pub mod probe;
pub mod round;
pub mod scheduler;
pub mod status;

pub use probe::Prober;
pub use round::RoundCoordinator;
pub use scheduler::{RoundScheduler, SchedulerExit};
pub use status::{RoundReport, SchedulerState, StatusSnapshot, StatusStore};

//! ピアリストCSVの読み込み
//!
//! 形式: 1行目はヘッダー、以降 `<pk>,<port または空>`

use crate::error::LoadError;
use dmsg_daemon_common::types::PeerTarget;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error};

/// CSVファイルからピアリストを読み込む
///
/// ファイルが開けない場合のみ失敗する。不正な行はスキップされる。
pub fn load_peer_targets(path: &Path) -> Result<Vec<PeerTarget>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let targets = parse_peer_targets(file)?;
    debug!(path = %path.display(), count = targets.len(), "Loaded peer list");
    Ok(targets)
}

/// CSVリーダーからピアリストをパースする
///
/// 行の順序を保持する。公開鍵・ポートが不正な行はエラーログを出してスキップ。
pub fn parse_peer_targets<R: Read>(reader: R) -> Result<Vec<PeerTarget>, LoadError> {
    // ヘッダー行も通常のレコードとして読み、内容を検証せずに捨てる
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut targets = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Err(e) if e.is_io_error() => return Err(LoadError::Csv(e)),
            _ if index == 0 => continue,
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "csv error: skipping malformed row");
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);

        let identity = record.get(0).unwrap_or_default();
        match PeerTarget::from_fields(identity, record.get(1)) {
            Ok(target) => targets.push(target),
            Err(e) => {
                error!(line, error = %e, "Skipping invalid peer record");
            }
        }
    }

    Ok(targets)
}

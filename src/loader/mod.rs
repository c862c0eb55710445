//! JSONL読み込み
//!
//! 1行1レコード。空行は無視し、解析できない行は警告を出して読み飛ばす。

use crate::error::{EvalAlignError, Result};
use eval_align_common::RawRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// 読み飛ばした行
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1始まりの行番号
    pub line: usize,
    pub error: String,
}

/// 読み込み結果
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<RawRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl LoadedRecords {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// JSONLファイルを読み込む
///
/// ファイル自体が開けない場合のみエラー。
pub fn load_jsonl(path: &Path) -> Result<LoadedRecords> {
    if !path.exists() {
        return Err(EvalAlignError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let loaded = parse_lines(BufReader::new(file), &path.display().to_string())?;

    info!(
        path = %path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped.len(),
        "loaded records"
    );
    Ok(loaded)
}

/// 任意のリーダーから読み込む
///
/// `source` は警告メッセージ中でファイルを識別するための名前。
pub fn parse_lines<R: BufRead>(reader: R, source: &str) -> Result<LoadedRecords> {
    let mut loaded = LoadedRecords::default();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_num = index + 1;
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(e) => {
                warn!(source, line = line_num, error = %e, "UTF-8でない行を読み飛ばします");
                loaded.skipped.push(SkippedLine {
                    line: line_num,
                    error: e.to_string(),
                });
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<RawRecord>(trimmed) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!(source, line = line_num, error = %e, "不正なJSON行を読み飛ばします");
                loaded.skipped.push(SkippedLine {
                    line: line_num,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

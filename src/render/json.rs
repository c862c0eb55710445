//! JSON出力

use crate::error::{EvalAlignError, Result};
use eval_align_common::NormalizedRecord;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// 照合に使ったレコード
#[derive(Debug, Serialize)]
pub struct RecordSet<'a> {
    pub left: &'a [NormalizedRecord],
    pub right: &'a [NormalizedRecord],
}

/// 出力ファイルの外枠
#[derive(Debug, Serialize)]
pub struct JsonExport<'a, T: Serialize> {
    pub generated_at: String,
    pub left_source: &'a str,
    pub right_source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<RecordSet<'a>>,
    #[serde(flatten)]
    pub body: &'a T,
}

impl<'a, T: Serialize> JsonExport<'a, T> {
    pub fn new(sources: (&'a str, &'a str), body: &'a T) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            left_source: sources.0,
            right_source: sources.1,
            records: None,
            body,
        }
    }

    pub fn with_records(mut self, left: &'a [NormalizedRecord], right: &'a [NormalizedRecord]) -> Self {
        self.records = Some(RecordSet { left, right });
        self
    }
}

/// 整形済みJSONを書き出す
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// JSONファイルに保存する
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| EvalAlignError::Export(format!("{}: {}", parent.display(), e)))?;
    }
    let mut file = std::fs::File::create(path)
        .map_err(|e| EvalAlignError::Export(format!("{}: {}", path.display(), e)))?;
    write_json(&mut file, value)
}

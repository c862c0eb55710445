pub mod json;
pub mod text;

use std::path::{Path, PathBuf};

/// 出力先がディレクトリ（または拡張子なし）ならファイル名を補う
pub fn output_path_for_json(output: &Path, default_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.json", default_name))
    } else {
        output.to_path_buf()
    }
}

//! サブコマンドの実処理
//!
//! main から呼ばれ、読み込み → 照合 → 出力 を行う。
//! 出力先を引数で受け取るためテストから直接呼べる。

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::loader;
use crate::render::{self, json::JsonExport, text::TextOptions};
use eval_align_common::{
    build_index, compare_exact, AlignmentReport, MetricComparison, Scorer, Threshold,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// align サブコマンドの設定
#[derive(Debug, Clone)]
pub struct AlignOptions {
    pub left: PathBuf,
    pub right: PathBuf,
    pub threshold: Threshold,
    pub metric_name: String,
    pub scorer: Scorer,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub show_responses: bool,
    pub parallel: bool,
}

impl AlignOptions {
    /// 設定値を既定としてCLI引数で上書きする
    pub fn new(left: PathBuf, right: PathBuf, config: &Config) -> Self {
        Self {
            left,
            right,
            threshold: config.default_threshold,
            metric_name: config.metric_name(),
            scorer: config.scorer,
            format: OutputFormat::Text,
            output: None,
            show_responses: true,
            parallel: false,
        }
    }

    /// 閾値文字列を寛容に解釈する（不正なら既定の70）
    pub fn with_threshold_arg(mut self, threshold: Option<&str>) -> Self {
        if let Some(arg) = threshold {
            self.threshold = Threshold::parse_or_default(arg);
        }
        self
    }
}

/// 2つのJSONLを照合し、レポートを出力する
pub fn run_align<W: Write>(options: &AlignOptions, out: &mut W) -> Result<AlignmentReport> {
    let left_raw = loader::load_jsonl(&options.left)?;
    let right_raw = loader::load_jsonl(&options.right)?;

    let left = build_index(&left_raw.records, &options.metric_name);
    let right = build_index(&right_raw.records, &options.metric_name);

    info!(
        left = left.len(),
        right = right.len(),
        threshold = %options.threshold,
        scorer = %options.scorer,
        metric = %options.metric_name,
        "aligning"
    );

    let report = if options.parallel {
        AlignmentReport::build_parallel(&left, &right, options.threshold, &options.scorer)
    } else {
        AlignmentReport::build(&left, &right, options.threshold, &options.scorer)
    };

    let left_name = options.left.display().to_string();
    let right_name = options.right.display().to_string();
    let sources = (left_name.as_str(), right_name.as_str());

    if options.format.includes_text() {
        let text_options = TextOptions {
            metric_name: options.metric_name.clone(),
            show_responses: options.show_responses,
        };
        render::text::write_alignment_report(out, &report, &left, &right, sources, &text_options)?;
    }

    if options.format.includes_json() || options.output.is_some() {
        let export = JsonExport::new(sources, &report).with_records(&left, &right);
        write_export(out, options.output.as_deref(), "alignment-report", &export)?;
    }

    Ok(report)
}

/// 完全一致プロンプトで複数指標を比較する
pub fn run_metrics<W: Write>(
    left_path: &Path,
    right_path: &Path,
    metrics: &[String],
    limit: usize,
    output: Option<&Path>,
    out: &mut W,
) -> Result<MetricComparison> {
    let left = loader::load_jsonl(left_path)?;
    let right = loader::load_jsonl(right_path)?;

    let comparison = compare_exact(&left.records, &right.records, metrics);
    render::text::write_metric_comparison(out, &comparison, limit)?;

    if let Some(path) = output {
        let left_name = left_path.display().to_string();
        let right_name = right_path.display().to_string();
        let export = JsonExport::new((left_name.as_str(), right_name.as_str()), &comparison);
        write_export(out, Some(path), "metric-comparison", &export)?;
    }

    Ok(comparison)
}

/// JSONをファイル（指定時）または out に書く
fn write_export<W: Write, T: serde::Serialize>(
    out: &mut W,
    output: Option<&Path>,
    default_name: &str,
    value: &T,
) -> Result<()> {
    match output {
        Some(path) => {
            let path = render::output_path_for_json(path, default_name);
            render::json::save_json(&path, value)?;
            writeln!(out, "✔ JSON出力: {}", path.display())?;
        }
        None => render::json::write_json(out, value)?,
    }
    Ok(())
}

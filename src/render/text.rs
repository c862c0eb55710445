//! テキストレポート出力

use eval_align_common::{
    AlignmentReport, Direction, MatchResult, MetricComparison, NormalizedRecord, PairMetrics,
    Summary,
};
use std::io::{self, Write};

/// テキスト出力オプション
#[derive(Debug, Clone)]
pub struct TextOptions {
    /// 表示用の指標名
    pub metric_name: String,
    /// 参照回答・モデル応答を表示する
    pub show_responses: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            metric_name: eval_align_common::DEFAULT_METRIC_NAME.into(),
            show_responses: true,
        }
    }
}

/// 照合レポートを書き出す
pub fn write_alignment_report<W: Write>(
    out: &mut W,
    report: &AlignmentReport,
    left: &[NormalizedRecord],
    right: &[NormalizedRecord],
    sources: (&str, &str),
    options: &TextOptions,
) -> io::Result<()> {
    writeln!(out, "===== 照合レポート: {} =====", options.metric_name)?;
    writeln!(out, "左: {}", sources.0)?;
    writeln!(out, "右: {}", sources.1)?;
    writeln!(out, "類似度の閾値: {}\n", report.threshold)?;

    for outcome in &report.outcomes {
        match outcome.result {
            MatchResult::Matched { left_id, right_id, score } => {
                let (Some(l), Some(r)) = (left.get(left_id), right.get(right_id)) else {
                    continue;
                };
                write_match(out, l, r, score, outcome.metrics.as_ref(), options)?;
            }
            MatchResult::AlreadyConsumed { left_id, right_id, score } => {
                writeln!(out, "----- 競合: 右レコードは他の左レコードと照合済み -----")?;
                writeln!(out, "左 ID={}: {}", left_id, quoted(left, left_id))?;
                writeln!(out, "右 ID={}: {}", right_id, quoted(right, right_id))?;
                writeln!(out, "類似度: {:.1}\n", score)?;
            }
            MatchResult::Unmatched { left_id, best_score } => {
                writeln!(out, "----- 不一致 -----")?;
                writeln!(out, "左 ID={}: {}", left_id, quoted(left, left_id))?;
                writeln!(
                    out,
                    "最良の類似度 {:.1} が閾値 {} 未満のため照合なし\n",
                    best_score, report.threshold
                )?;
            }
        }
    }

    if !report.summary.unconsumed_right_ids.is_empty() {
        writeln!(out, "----- 右側の未照合レコード -----")?;
        for &id in &report.summary.unconsumed_right_ids {
            writeln!(out, "  ID={} - {}", id, quoted(right, id))?;
        }
        writeln!(out)?;
    }

    write_summary(out, &report.summary, &options.metric_name)
}

fn write_match<W: Write>(
    out: &mut W,
    left: &NormalizedRecord,
    right: &NormalizedRecord,
    score: f64,
    metrics: Option<&PairMetrics>,
    options: &TextOptions,
) -> io::Result<()> {
    writeln!(out, "----- 一致 -----")?;
    writeln!(out, "類似度: {:.1} / 100", score)?;
    writeln!(out, "左 ID={}: \"{}\"", left.id(), left.prompt())?;
    writeln!(out, "右 ID={}: \"{}\"", right.id(), right.prompt())?;
    if let Some(category) = left.category().or(right.category()) {
        writeln!(out, "カテゴリ: {}", category)?;
    }

    if options.show_responses {
        writeln!(out, "\n参照回答:")?;
        writeln!(out, "  - 左: {}", left.reference())?;
        writeln!(out, "  - 右: {}", right.reference())?;
        write_responses(out, "左", left.responses())?;
        write_responses(out, "右", right.responses())?;
    }

    writeln!(out, "\n{}:", options.metric_name)?;
    writeln!(out, "  - 左: {}", display_metric(left.metric()))?;
    writeln!(out, "  - 右: {}", display_metric(right.metric()))?;

    match metrics {
        Some(m) => {
            match m.direction {
                Direction::Same => writeln!(out, "実質同じ（差 < 1e-8）")?,
                Direction::RightGreater => writeln!(out, "右が {:.5} 高い", m.abs_diff)?,
                Direction::LeftGreater => writeln!(out, "左が {:.5} 高い", m.abs_diff)?,
            }
            match m.pct_change {
                Some(pct) => writeln!(out, "変化率: {:.2}%（= 100 * |右 - 左| / 平均）", pct)?,
                None => writeln!(out, "（両方ほぼ0のため変化率は計算しません）")?,
            }
        }
        None => writeln!(out, "指標を比較できません（片方または両方が欠損）")?,
    }

    writeln!(out)
}

fn write_responses<W: Write>(out: &mut W, side: &str, responses: &[String]) -> io::Result<()> {
    writeln!(out, "モデル応答（{}）:", side)?;
    if responses.is_empty() {
        writeln!(out, "  （応答なし）")?;
    }
    for response in responses {
        writeln!(out, "  - {}", response)?;
    }
    Ok(())
}

/// 集計を書き出す
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary, metric_name: &str) -> io::Result<()> {
    writeln!(out, "===== 集計: {} =====", metric_name)?;
    writeln!(
        out,
        "照合: {} 件 / 競合: {} 件 / 不一致: {} 件 / 指標欠損: {} 件",
        summary.matched, summary.already_consumed, summary.unmatched, summary.pairs_without_metric
    )?;
    writeln!(out, "  右 > 左: {} 件", summary.right_greater)?;
    writeln!(out, "  左 > 右: {} 件", summary.left_greater)?;
    writeln!(out, "  同じ:    {} 件\n", summary.same)?;

    match summary.mean_abs_diff {
        Some(v) => writeln!(out, "平均絶対差: {:.5}", v)?,
        None => writeln!(out, "指標のある照合ペアがないため平均絶対差を計算できません")?,
    }
    match summary.mean_signed_diff {
        Some(m) => writeln!(out, "平均符号付き差（右 - 左）: {:.5}（{}）", m.value, m.direction)?,
        None => writeln!(out, "指標のある照合ペアがないため平均符号付き差を計算できません")?,
    }
    match summary.mean_pct_change {
        Some(v) => writeln!(
            out,
            "平均変化率: {:.2}%（{} ペア、平均がほぼ0のペアを除く）",
            v, summary.pct_change_samples
        )?,
        None => writeln!(out, "変化率を計算できるペアがないため平均変化率を計算できません")?,
    }

    Ok(())
}

/// 複数指標比較を書き出す
pub fn write_metric_comparison<W: Write>(
    out: &mut W,
    comparison: &MetricComparison,
    limit: usize,
) -> io::Result<()> {
    writeln!(out, "共通プロンプト: {} 件\n", comparison.common_prompts())?;

    writeln!(out, "平均差（右 - 左）:")?;
    for (metric, diff) in &comparison.average_differences {
        writeln!(out, "  {}: {:.4}", metric, diff)?;
    }

    if comparison.prompt_level_comparison.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nプロンプト別（先頭 {} 件）:", limit)?;
    for prompt in comparison.prompt_level_comparison.iter().take(limit) {
        writeln!(out, "  プロンプト: {}", prompt.prompt)?;
        for (metric, diff) in &prompt.differences {
            writeln!(out, "    {}: {:.4}", metric, diff)?;
        }
        writeln!(out, "{}", "-".repeat(20))?;
    }

    Ok(())
}

fn quoted(records: &[NormalizedRecord], id: usize) -> String {
    records
        .get(id)
        .map(|r| format!("\"{}\"", r.prompt()))
        .unwrap_or_else(|| "(不明)".to_string())
}

fn display_metric(metric: Option<f64>) -> String {
    metric.map(|v| v.to_string()).unwrap_or_else(|| "なし".to_string())
}

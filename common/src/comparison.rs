//! 完全一致プロンプトでの複数指標比較
//!
//! 類似度照合を使わず、プロンプト文字列が完全に一致するレコード同士で
//! 複数の指標（Accuracy / Toxicity / Robustness など）の差を平均する。
//! 欠けている指標は 0 として扱う。スコアが不完全なレコードは読み飛ばす。

use crate::types::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 既定の比較対象指標
pub const DEFAULT_TRACKED_METRICS: &[&str] = &["Accuracy", "Toxicity", "Robustness"];

/// プロンプト単位の差分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptComparison {
    pub prompt: String,
    /// 指標名 → (右 - 左)
    pub differences: BTreeMap<String, f64>,
}

/// 複数指標比較の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// 指標名 → 平均差（共通プロンプトがなければ 0）
    pub average_differences: BTreeMap<String, f64>,
    /// プロンプト昇順
    pub prompt_level_comparison: Vec<PromptComparison>,
}

impl MetricComparison {
    pub fn common_prompts(&self) -> usize {
        self.prompt_level_comparison.len()
    }
}

/// プロンプト → (指標名 → 値)
///
/// 同じプロンプト・同じ指標が複数あれば後のものが上書きする。
/// プロンプトや評価結果がない、または指標名・値の欠けたスコアを含む
/// レコードは丸ごと対象外とし、先に登録された同じプロンプトを残す。
fn index_scores(records: &[RawRecord]) -> BTreeMap<&str, BTreeMap<&str, f64>> {
    let mut index: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();

    for record in records {
        let Some(prompt) = record.input_record.as_ref().and_then(|i| i.prompt.as_deref()) else {
            continue;
        };
        let Some(evaluation) = record.automated_evaluation_result.as_ref() else {
            debug!(prompt, "評価結果のないレコードを除外");
            continue;
        };

        let scores: Option<BTreeMap<&str, f64>> = evaluation
            .scores
            .iter()
            .map(|s| Some((s.metric_name.as_deref()?, s.result?)))
            .collect();

        match scores {
            Some(scores) => {
                index.insert(prompt, scores);
            }
            None => debug!(prompt, "不完全なスコアを含むレコードを除外"),
        }
    }

    index
}

/// 完全一致プロンプトで複数指標を比較する
///
/// # Arguments
/// * `left` - 左コレクション
/// * `right` - 右コレクション
/// * `metrics` - 比較する指標名
pub fn compare_exact<M: AsRef<str>>(
    left: &[RawRecord],
    right: &[RawRecord],
    metrics: &[M],
) -> MetricComparison {
    let left_index = index_scores(left);
    let right_index = index_scores(right);

    let mut totals: BTreeMap<String, f64> = metrics
        .iter()
        .map(|m| (m.as_ref().to_string(), 0.0))
        .collect();
    let mut prompt_level_comparison = Vec::new();

    for (prompt, left_scores) in &left_index {
        let Some(right_scores) = right_index.get(prompt) else {
            continue;
        };

        let mut differences = BTreeMap::new();
        for metric in metrics {
            let name = metric.as_ref();
            let diff = right_scores.get(name).copied().unwrap_or(0.0)
                - left_scores.get(name).copied().unwrap_or(0.0);
            differences.insert(name.to_string(), diff);
            *totals.entry(name.to_string()).or_insert(0.0) += diff;
        }

        prompt_level_comparison.push(PromptComparison {
            prompt: prompt.to_string(),
            differences,
        });
    }

    let common = prompt_level_comparison.len();
    let average_differences = totals
        .into_iter()
        .map(|(name, total)| {
            let average = if common > 0 { total / common as f64 } else { 0.0 };
            (name, average)
        })
        .collect();

    MetricComparison {
        average_differences,
        prompt_level_comparison,
    }
}

//! 集計
//!
//! 照合結果とペア差分を畳み込み、件数と平均値をまとめる。
//! 計算できない平均は 0 ではなく None として返す。

use crate::alignment::{unconsumed_right_ids, MatchResult};
use crate::differential::{Direction, PairMetrics, EPSILON};
use serde::{Deserialize, Serialize};

/// 平均符号付き差の向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageDirection {
    /// |平均| < EPSILON
    EffectivelySame,
    RightHigher,
    LeftHigher,
}

impl std::fmt::Display for AverageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AverageDirection::EffectivelySame => write!(f, "平均すると実質同じ"),
            AverageDirection::RightHigher => write!(f, "平均すると右がやや高い"),
            AverageDirection::LeftHigher => write!(f, "平均すると左がやや高い"),
        }
    }
}

/// 平均符号付き差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignedMean {
    pub value: f64,
    pub direction: AverageDirection,
}

impl SignedMean {
    fn new(value: f64) -> Self {
        let direction = if value.abs() < EPSILON {
            AverageDirection::EffectivelySame
        } else if value > 0.0 {
            AverageDirection::RightHigher
        } else {
            AverageDirection::LeftHigher
        };
        Self { value, direction }
    }
}

/// 集計結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// 照合成功数
    pub matched: usize,
    /// 消費済みで弾かれた数
    pub already_consumed: usize,
    /// 閾値未満の数
    pub unmatched: usize,
    /// 照合成功したが指標が欠けていたペア数
    pub pairs_without_metric: usize,

    pub same: usize,
    pub right_greater: usize,
    pub left_greater: usize,

    pub mean_abs_diff: Option<f64>,
    pub mean_signed_diff: Option<SignedMean>,
    /// 変化率を計算できたペアのみの平均
    pub mean_pct_change: Option<f64>,
    /// 変化率の平均に使ったペア数
    pub pct_change_samples: usize,

    /// どの左レコードにも消費されなかった右ID
    pub unconsumed_right_ids: Vec<usize>,
}

/// 照合結果とペア差分を集計する
///
/// # Arguments
/// * `results` - [`crate::alignment::align`] の結果
/// * `pair_metrics` - 指標を計算できた照合ペアの差分
/// * `right_len` - 右コレクションの件数（未消費IDの補集合計算用）
pub fn summarize(results: &[MatchResult], pair_metrics: &[PairMetrics], right_len: usize) -> Summary {
    let mut summary = Summary {
        unconsumed_right_ids: unconsumed_right_ids(results, right_len),
        ..Default::default()
    };

    for result in results {
        match result {
            MatchResult::Matched { .. } => summary.matched += 1,
            MatchResult::AlreadyConsumed { .. } => summary.already_consumed += 1,
            MatchResult::Unmatched { .. } => summary.unmatched += 1,
        }
    }
    summary.pairs_without_metric = summary.matched.saturating_sub(pair_metrics.len());

    for metrics in pair_metrics {
        match metrics.direction {
            Direction::Same => summary.same += 1,
            Direction::RightGreater => summary.right_greater += 1,
            Direction::LeftGreater => summary.left_greater += 1,
        }
    }

    summary.mean_abs_diff = mean(pair_metrics.iter().map(|m| m.abs_diff));
    summary.mean_signed_diff = mean(pair_metrics.iter().map(|m| m.signed_diff)).map(SignedMean::new);

    let pct_changes: Vec<f64> = pair_metrics.iter().filter_map(|m| m.pct_change).collect();
    summary.pct_change_samples = pct_changes.len();
    summary.mean_pct_change = mean(pct_changes.into_iter());

    summary
}

/// 算術平均（空ならNone）
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

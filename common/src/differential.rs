//! 指標の差分計算
//!
//! 対応付けたペアの指標値から、符号付き差・絶対差・変化率を求める。

use serde::{Deserialize, Serialize};

/// 「同じ」とみなす差の上限、および変化率を計算する平均値の下限
pub const EPSILON: f64 = 1e-8;

/// どちらの指標が大きいか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 差が EPSILON 未満
    Same,
    RightGreater,
    LeftGreater,
}

/// ペア単位の差分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairMetrics {
    pub left: f64,
    pub right: f64,
    /// |right - left|
    pub abs_diff: f64,
    /// right - left
    pub signed_diff: f64,
    /// 100 * abs_diff / mean(left, right)。平均がほぼ0なら None
    pub pct_change: Option<f64>,
    pub direction: Direction,
}

/// 2つの指標値から差分を計算する
///
/// どちらかが欠損していれば None（差分を計算できない）。
pub fn score_pair(metric_left: Option<f64>, metric_right: Option<f64>) -> Option<PairMetrics> {
    let (left, right) = (metric_left?, metric_right?);

    let signed_diff = right - left;
    let abs_diff = signed_diff.abs();

    let direction = if abs_diff < EPSILON {
        Direction::Same
    } else if right > left {
        Direction::RightGreater
    } else {
        Direction::LeftGreater
    };

    let mean = (left + right) / 2.0;
    let pct_change = (mean >= EPSILON).then(|| 100.0 * abs_diff / mean);

    Some(PairMetrics {
        left,
        right,
        abs_diff,
        signed_diff,
        pct_change,
        direction,
    })
}

//! プロンプト照合エンジン
//!
//! 左コレクションの各レコードについて、右コレクション全体を走査して
//! 類似度が最大の候補を探し、閾値以上なら対応付ける。
//!
//! ## 規則
//! 1. 左は入力順に処理する。先に処理された左レコードが優先される
//! 2. 同点の最大値は先に走査した（IDの小さい）右レコードが勝つ
//! 3. 右レコードは高々1回しか消費されない
//! 4. 最良候補が既に消費済みなら `AlreadyConsumed` とし、次点への切り替えはしない

use crate::error::{Error, Result};
use crate::similarity::Similarity;
use crate::types::NormalizedRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// 照合の閾値（0〜100の整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Threshold(u8);

impl Threshold {
    /// 既定値 70
    pub const DEFAULT: Threshold = Threshold(70);

    pub fn new(value: u8) -> Result<Self> {
        if value > 100 {
            return Err(Error::Parse(format!("閾値が範囲外: {} (0〜100)", value)));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 文字列から寛容に解釈する
    ///
    /// 整数として読めない、または0〜100の範囲外なら既定値70を返す。
    pub fn parse_or_default(input: &str) -> Self {
        match input.parse::<Self>() {
            Ok(threshold) => threshold,
            Err(e) => {
                tracing::warn!(input, error = %e, "閾値を解釈できないため既定値{}を使用", Self::DEFAULT);
                Self::DEFAULT
            }
        }
    }

    /// スコアが閾値以上か
    pub fn accepts(self, score: f64) -> bool {
        score >= f64::from(self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Threshold {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for u8 {
    fn from(threshold: Threshold) -> u8 {
        threshold.0
    }
}

impl std::str::FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("閾値が整数ではありません: {:?}", s)))?;
        let value = u8::try_from(value)
            .map_err(|_| Error::Parse(format!("閾値が範囲外: {} (0〜100)", value)))?;
        Self::new(value)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 左レコード1件ごとの照合結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchResult {
    /// 対応付け成功
    Matched {
        left_id: usize,
        right_id: usize,
        score: f64,
    },
    /// 最良候補は見つかったが、先行する左レコードが既に消費していた
    AlreadyConsumed {
        left_id: usize,
        right_id: usize,
        score: f64,
    },
    /// 閾値に届く候補なし
    Unmatched { left_id: usize, best_score: f64 },
}

impl MatchResult {
    pub fn left_id(&self) -> usize {
        match *self {
            MatchResult::Matched { left_id, .. }
            | MatchResult::AlreadyConsumed { left_id, .. }
            | MatchResult::Unmatched { left_id, .. } => left_id,
        }
    }

    /// 最良候補の右ID（Unmatchedの場合None）
    pub fn right_id(&self) -> Option<usize> {
        match *self {
            MatchResult::Matched { right_id, .. } | MatchResult::AlreadyConsumed { right_id, .. } => {
                Some(right_id)
            }
            MatchResult::Unmatched { .. } => None,
        }
    }

    /// 観測した最良スコア
    pub fn score(&self) -> f64 {
        match *self {
            MatchResult::Matched { score, .. } | MatchResult::AlreadyConsumed { score, .. } => score,
            MatchResult::Unmatched { best_score, .. } => best_score,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// 1件の左レコードに対する最良候補
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub right_id: Option<usize>,
    pub score: f64,
}

/// 右コレクション全体を走査して最良候補を探す
///
/// 厳密な `>` で更新するため、同点では先に見た右レコードが残る。
/// 全スコアが0なら候補なし（right_id = None, score = 0）。
pub fn best_candidate<S>(prompt: &str, right: &[NormalizedRecord], oracle: &S) -> Candidate
where
    S: Similarity + ?Sized,
{
    let mut best = Candidate {
        right_id: None,
        score: 0.0,
    };

    for candidate in right {
        let score = oracle.score(prompt, candidate.prompt());
        if score > best.score {
            best = Candidate {
                right_id: Some(candidate.id()),
                score,
            };
        }
    }

    best
}

/// 左右のコレクションを照合する
///
/// 左レコードごとに1件、左の入力順で結果を返す。
pub fn align<S>(
    left: &[NormalizedRecord],
    right: &[NormalizedRecord],
    threshold: Threshold,
    oracle: &S,
) -> Vec<MatchResult>
where
    S: Similarity + ?Sized,
{
    let candidates = left
        .iter()
        .map(|record| best_candidate(record.prompt(), right, oracle));
    resolve(left, candidates, threshold)
}

/// 候補探索だけを並列化した [`align`]
///
/// 消費判定は左の入力順に直列で行うため、結果は [`align`] と同一。
#[cfg(feature = "parallel")]
pub fn align_parallel<S>(
    left: &[NormalizedRecord],
    right: &[NormalizedRecord],
    threshold: Threshold,
    oracle: &S,
) -> Vec<MatchResult>
where
    S: Similarity + Sync + ?Sized,
{
    use rayon::prelude::*;

    let candidates: Vec<Candidate> = left
        .par_iter()
        .map(|record| best_candidate(record.prompt(), right, oracle))
        .collect();
    resolve(left, candidates, threshold)
}

/// 候補列に閾値と消費済み判定を適用する
fn resolve<I>(left: &[NormalizedRecord], candidates: I, threshold: Threshold) -> Vec<MatchResult>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut consumed: HashSet<usize> = HashSet::new();

    left.iter()
        .zip(candidates)
        .map(|(record, candidate)| {
            let left_id = record.id();
            match candidate.right_id {
                Some(right_id) if threshold.accepts(candidate.score) => {
                    if consumed.insert(right_id) {
                        debug!(left_id, right_id, score = candidate.score, "matched");
                        MatchResult::Matched {
                            left_id,
                            right_id,
                            score: candidate.score,
                        }
                    } else {
                        debug!(left_id, right_id, score = candidate.score, "already consumed");
                        MatchResult::AlreadyConsumed {
                            left_id,
                            right_id,
                            score: candidate.score,
                        }
                    }
                }
                _ => {
                    debug!(left_id, best_score = candidate.score, %threshold, "unmatched");
                    MatchResult::Unmatched {
                        left_id,
                        best_score: candidate.score,
                    }
                }
            }
        })
        .collect()
}

/// 一度も消費されなかった右IDを昇順で返す
pub fn unconsumed_right_ids(results: &[MatchResult], right_len: usize) -> Vec<usize> {
    let consumed: HashSet<usize> = results
        .iter()
        .filter_map(|r| match *r {
            MatchResult::Matched { right_id, .. } => Some(right_id),
            _ => None,
        })
        .collect();

    (0..right_len).filter(|id| !consumed.contains(id)).collect()
}

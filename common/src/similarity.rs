//! 類似度オラクル
//!
//! 2つのプロンプトの類似度を 0〜100 で返す。照合エンジンは
//! [`Similarity`] トレイト越しにのみ利用するため、任意の関数を差し込める。
//!
//! 組み込みスコアラ:
//! - `partial`: 短い方の文字列と、長い方の最も似た部分窓とのindel比（既定）
//! - `ratio`: 文字列全体同士のindel比
//!
//! `partial_ratio` は最悪で O(n²·m)（n: 短い方, m: 長い方の文字数）。
//! 文字の重なりで見込みのない窓を省くが、長いプロンプト同士を
//! 数千×数千件で照合すると重くなる。その場合は `ratio` か `--parallel` を使う。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 類似度スコアの上限
pub const MAX_SCORE: f64 = 100.0;

/// 類似度オラクル
pub trait Similarity {
    /// 0〜100 の類似度を返す。値が大きいほど似ている。
    fn score(&self, a: &str, b: &str) -> f64;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// 組み込みスコアラ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scorer {
    /// 部分一致比（既定）
    #[default]
    Partial,
    /// 全体比
    Ratio,
}

impl Similarity for Scorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Scorer::Partial => partial_ratio(a, b),
            Scorer::Ratio => ratio(a, b),
        }
    }
}

impl std::str::FromStr for Scorer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "partial" | "partial_ratio" => Ok(Scorer::Partial),
            "ratio" | "full" => Ok(Scorer::Ratio),
            _ => Err(Error::Config(format!(
                "未知のスコアラ: {}. partial または ratio を指定してください",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scorer::Partial => write!(f, "partial"),
            Scorer::Ratio => write!(f, "ratio"),
        }
    }
}

/// 全体のindel比（0〜100）
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    ratio_chars(&a_chars, &b_chars)
}

/// 部分一致比（0〜100）
///
/// 短い方を長い方の各位置に重ね、最も高い比を返す。
/// 両端では短い窓（はみ出し部分）も評価する。
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { MAX_SCORE } else { 0.0 };
    }
    if short.len() == long.len() {
        return ratio_chars(short, long);
    }

    let n = short.len();
    let m = long.len();
    let mut best: f64 = 0.0;

    // 全長窓。窓と短い方の文字の多重集合の重なりがLCSの上限になるため、
    // 上限が現在の最良値以下の窓はDPを省く
    let mut needed: HashMap<char, usize> = HashMap::new();
    for &c in short.iter() {
        *needed.entry(c).or_insert(0) += 1;
    }
    let mut window: HashMap<char, usize> = HashMap::with_capacity(needed.len());
    let mut overlap = 0usize;

    for (end, &c) in long.iter().enumerate() {
        let count = window.entry(c).or_insert(0);
        if *count < needed.get(&c).copied().unwrap_or(0) {
            overlap += 1;
        }
        *count += 1;

        if end >= n {
            let out = long[end - n];
            let count = window.entry(out).or_insert(1);
            *count -= 1;
            if *count < needed.get(&out).copied().unwrap_or(0) {
                overlap -= 1;
            }
        }

        if end + 1 < n {
            continue;
        }
        let upper = MAX_SCORE * overlap as f64 / n as f64;
        if upper <= best {
            continue;
        }

        let start = end + 1 - n;
        best = best.max(ratio_chars(short, &long[start..start + n]));
        if best >= MAX_SCORE {
            return MAX_SCORE;
        }
    }

    // 両端の短い窓。長さkの窓の上限は 200k/(n+k)
    for k in (1..n).rev() {
        let upper = 2.0 * MAX_SCORE * k as f64 / (n + k) as f64;
        if upper <= best {
            break;
        }
        best = best.max(ratio_chars(short, &long[..k]));
        best = best.max(ratio_chars(short, &long[m - k..]));
    }

    best
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return MAX_SCORE;
    }
    let distance = indel_distance(a, b);
    MAX_SCORE * (1.0 - distance as f64 / total as f64)
}

/// 挿入・削除のみの編集距離（置換はコスト2）
fn indel_distance(a: &[char], b: &[char]) -> usize {
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 2 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_indel_distance() {
        assert_eq!(indel_distance(&chars(""), &chars("abc")), 3);
        assert_eq!(indel_distance(&chars("abc"), &chars("abc")), 0);
        assert_eq!(indel_distance(&chars("abc"), &chars("abd")), 2);
        assert_eq!(indel_distance(&chars("kitten"), &chars("sitting")), 5);
    }

    #[test]
    fn test_ratio() {
        assert!((ratio("abc", "abc") - 100.0).abs() < 1e-9);
        assert!((ratio("", "") - 100.0).abs() < 1e-9);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        // LCS=4, 合計13文字 → 100 * 8 / 13
        assert!((ratio("kitten", "sitting") - 800.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert!((partial_ratio("France", "What is the capital of France?") - 100.0).abs() < 1e-9);
        assert!((partial_ratio("What is the capital of France?", "France") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "abc"), 0.0);
        assert_eq!(partial_ratio("abc", ""), 0.0);
        assert!((partial_ratio("", "") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ratio_paraphrase() {
        let score = partial_ratio("What is the capital of France?", "What's the capital of France");
        assert!(score >= 70.0, "score = {}", score);
        assert!(score < 100.0);
    }

    #[test]
    fn test_partial_ratio_unrelated() {
        let score = partial_ratio("Capital of France?", "Tallest mountain on Earth?");
        assert!(score < 70.0, "score = {}", score);
    }

    #[test]
    fn test_partial_ratio_symmetric() {
        let pairs = [
            ("hello world", "world"),
            ("abcdef", "xbcdyz"),
            ("東京都の人口は？", "東京の人口"),
        ];
        for (a, b) in pairs {
            assert!((partial_ratio(a, b) - partial_ratio(b, a)).abs() < 1e-9);
        }
    }

    /// 全ての窓を総当たりする参照実装
    fn partial_ratio_exhaustive(a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        if short.is_empty() {
            return if long.is_empty() { MAX_SCORE } else { 0.0 };
        }
        let (n, m) = (short.len(), long.len());
        let mut best: f64 = 0.0;
        for start in 0..=(m - n) {
            best = best.max(ratio_chars(short, &long[start..start + n]));
        }
        for k in 1..n.min(m + 1) {
            best = best.max(ratio_chars(short, &long[..k]));
            best = best.max(ratio_chars(short, &long[m - k..]));
        }
        best
    }

    #[test]
    fn test_partial_ratio_matches_exhaustive_search() {
        let cases = [
            ("abc", "xxabcxx"),
            ("France capital", "What is the capital of France?"),
            ("aab", "abababbbaaab"),
            ("zzz", "the quick brown fox"),
            ("tallest mountain", "Which is the tallest mountain on Earth, and how tall is it?"),
            ("入力を要約してください", "次の入力を三行で要約してください。"),
            ("ab", "bab"),
        ];
        for (a, b) in cases {
            let pruned = partial_ratio(a, b);
            let exhaustive = partial_ratio_exhaustive(a, b);
            assert!(
                (pruned - exhaustive).abs() < 1e-9,
                "{:?} vs {:?}: {} != {}",
                a,
                b,
                pruned,
                exhaustive
            );
        }
    }

    #[test]
    fn test_partial_ratio_long_prompt() {
        let needle = "summarize the following paragraph in one sentence";
        let haystack = format!("{} {} {}", "lorem ipsum ".repeat(200), needle, "dolor sit amet ".repeat(200));
        assert_eq!(partial_ratio(needle, &haystack), MAX_SCORE);
    }

    #[test]
    fn test_scorer_from_str() {
        assert_eq!("partial".parse::<Scorer>().unwrap(), Scorer::Partial);
        assert_eq!("RATIO".parse::<Scorer>().unwrap(), Scorer::Ratio);
        assert!("fuzzy".parse::<Scorer>().is_err());
    }

    #[test]
    fn test_closure_as_oracle() {
        let oracle = |a: &str, b: &str| if a == b { 100.0 } else { 0.0 };
        assert_eq!(oracle.score("x", "x"), 100.0);
        assert_eq!(oracle.score("x", "y"), 0.0);
    }
}

//! 照合レポート
//!
//! 照合 → ペア差分 → 集計 を1回で実行し、出力用にまとめる。

use crate::alignment::{align, MatchResult, Threshold};
use crate::differential::{score_pair, PairMetrics};
use crate::similarity::Similarity;
use crate::summary::{summarize, Summary};
use crate::types::NormalizedRecord;
use serde::{Deserialize, Serialize};

/// 左レコード1件分の結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairOutcome {
    #[serde(flatten)]
    pub result: MatchResult,
    /// Matchedかつ両方の指標がある場合のみ
    pub metrics: Option<PairMetrics>,
}

/// 照合レポート全体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub threshold: Threshold,
    pub outcomes: Vec<PairOutcome>,
    pub summary: Summary,
}

impl AlignmentReport {
    /// 逐次照合でレポートを作る
    pub fn build<S>(
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: Threshold,
        oracle: &S,
    ) -> Self
    where
        S: Similarity + ?Sized,
    {
        let results = align(left, right, threshold, oracle);
        Self::from_results(left, right, threshold, results)
    }

    /// 並列照合でレポートを作る（結果は [`AlignmentReport::build`] と同一）
    #[cfg(feature = "parallel")]
    pub fn build_parallel<S>(
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: Threshold,
        oracle: &S,
    ) -> Self
    where
        S: Similarity + Sync + ?Sized,
    {
        let results = crate::alignment::align_parallel(left, right, threshold, oracle);
        Self::from_results(left, right, threshold, results)
    }

    /// 照合結果からペア差分と集計を組み立てる
    pub fn from_results(
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: Threshold,
        results: Vec<MatchResult>,
    ) -> Self {
        let outcomes: Vec<PairOutcome> = results
            .iter()
            .map(|&result| {
                let metrics = match result {
                    MatchResult::Matched { left_id, right_id, .. } => score_pair(
                        left.get(left_id).and_then(|r| r.metric()),
                        right.get(right_id).and_then(|r| r.metric()),
                    ),
                    _ => None,
                };
                PairOutcome { result, metrics }
            })
            .collect();

        let pair_metrics: Vec<PairMetrics> = outcomes.iter().filter_map(|o| o.metrics).collect();
        let summary = summarize(&results, &pair_metrics, right.len());

        Self {
            threshold,
            outcomes,
            summary,
        }
    }

    /// Matchedのペアを (左, 右, 差分) で列挙する
    pub fn matched_pairs<'a>(
        &'a self,
        left: &'a [NormalizedRecord],
        right: &'a [NormalizedRecord],
    ) -> impl Iterator<Item = (&'a NormalizedRecord, &'a NormalizedRecord, Option<&'a PairMetrics>)> + 'a {
        self.outcomes.iter().filter_map(move |outcome| match outcome.result {
            MatchResult::Matched { left_id, right_id, .. } => Some((
                left.get(left_id)?,
                right.get(right_id)?,
                outcome.metrics.as_ref(),
            )),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Scorer;

    fn record(id: usize, prompt: &str, metric: Option<f64>) -> NormalizedRecord {
        NormalizedRecord::new(id, prompt, metric, "", Vec::new())
    }

    #[test]
    fn test_build_round_trip_example() {
        let left = vec![record(0, "What is the capital of France?", Some(0.10))];
        let right = vec![record(0, "What's the capital of France", Some(0.12))];

        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);

        assert_eq!(report.outcomes.len(), 1);
        let outcome = report.outcomes[0];
        assert!(outcome.result.is_matched());
        assert!(outcome.result.score() >= 70.0);

        let metrics = outcome.metrics.unwrap();
        assert!((metrics.abs_diff - 0.02).abs() < 1e-9);
        assert!((metrics.signed_diff - 0.02).abs() < 1e-9);
        assert!((metrics.pct_change.unwrap() - 18.18).abs() < 0.01);

        assert_eq!(report.summary.right_greater, 1);
        assert!(report.summary.unconsumed_right_ids.is_empty());
    }

    #[test]
    fn test_build_unmatched_example() {
        let left = vec![record(0, "Capital of France?", None)];
        let right = vec![record(0, "Tallest mountain on Earth?", None)];

        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);

        match report.outcomes[0].result {
            MatchResult::Unmatched { best_score, .. } => assert!(best_score < 70.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(report.outcomes[0].metrics.is_none());
        assert_eq!(report.summary.unconsumed_right_ids, vec![0]);
        assert!(report.summary.mean_abs_diff.is_none());
    }

    #[test]
    fn test_build_matched_without_metric() {
        let left = vec![record(0, "same", Some(0.4))];
        let right = vec![record(0, "same", None)];

        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);

        assert!(report.outcomes[0].result.is_matched());
        assert!(report.outcomes[0].metrics.is_none());
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.pairs_without_metric, 1);
        assert!(report.summary.mean_abs_diff.is_none());
    }

    #[test]
    fn test_already_consumed_has_no_metrics() {
        let left = vec![record(0, "same", Some(0.1)), record(1, "same", Some(0.9))];
        let right = vec![record(0, "same", Some(0.2))];

        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);

        assert!(report.outcomes[0].metrics.is_some());
        assert!(report.outcomes[1].metrics.is_none());
        assert_eq!(report.summary.already_consumed, 1);
    }

    #[test]
    fn test_matched_pairs_iterator() {
        let left = vec![record(0, "alpha", Some(0.1)), record(1, "zzz", None)];
        let right = vec![record(0, "beta", None), record(1, "alpha", Some(0.3))];

        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);
        let pairs: Vec<_> = report.matched_pairs(&left, &right).collect();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.prompt(), "alpha");
        assert_eq!(pairs[0].1.id(), 1);
        assert!(pairs[0].2.is_some());
    }

    #[test]
    fn test_report_serializes_undefined_means_as_null() {
        let report = AlignmentReport::build(&[], &[], Threshold::DEFAULT, &Scorer::Partial);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["threshold"], 70);
        assert!(json["summary"]["mean_abs_diff"].is_null());
        assert!(json["summary"]["mean_pct_change"].is_null());
    }

    #[test]
    fn test_outcome_serialization_is_flat() {
        let left = vec![record(0, "same", Some(0.1))];
        let right = vec![record(0, "same", Some(0.1))];
        let report = AlignmentReport::build(&left, &right, Threshold::DEFAULT, &Scorer::Partial);
        let json = serde_json::to_value(&report).unwrap();

        let outcome = &json["outcomes"][0];
        assert_eq!(outcome["outcome"], "matched");
        assert_eq!(outcome["right_id"], 0);
        assert_eq!(outcome["metrics"]["direction"], "same");
    }
}

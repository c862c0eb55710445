//! Eval Align Common Library
//!
//! 評価レコードの照合・差分計算・集計。I/Oを持たない純粋な処理のみ。

pub mod types;
pub mod error;
pub mod record;
pub mod similarity;
pub mod alignment;
pub mod differential;
pub mod summary;
pub mod report;
pub mod comparison;

pub use types::{NormalizedRecord, RawRecord};
pub use error::{Error, Result};
pub use record::{build_index, normalize, DEFAULT_METRIC_NAME};
pub use similarity::{Scorer, Similarity};
pub use alignment::{align, unconsumed_right_ids, MatchResult, Threshold};
#[cfg(feature = "parallel")]
pub use alignment::align_parallel;
pub use differential::{score_pair, Direction, PairMetrics};
pub use summary::{summarize, AverageDirection, SignedMean, Summary};
pub use report::{AlignmentReport, PairOutcome};
pub use comparison::{compare_exact, MetricComparison, DEFAULT_TRACKED_METRICS};

//! レコード正規化
//!
//! 形の揃わない評価レコードから、照合に使う正規化ビューを取り出す。
//! 任意フィールドの欠損はエラーにせず既定値で埋める:
//! - プロンプト欠損 → 空文字列
//! - 指標欠損 → None
//! - 参照回答欠損 → 空文字列
//! - モデル応答欠損 → 空リスト

use crate::types::{NormalizedRecord, RawRecord};

/// 既定の追跡指標名
pub const DEFAULT_METRIC_NAME: &str = "Toxicity";

/// 1レコードを正規化する
///
/// # Arguments
/// * `raw` - 評価ジョブ出力の1レコード
/// * `index` - コレクション内の位置（そのままIDになる）
/// * `metric_name` - 追跡する指標名（例: "Toxicity"）
pub fn normalize(raw: &RawRecord, index: usize, metric_name: &str) -> NormalizedRecord {
    let input = raw.input_record.as_ref();

    let prompt = input
        .and_then(|i| i.prompt.clone())
        .unwrap_or_default();

    let reference = input
        .and_then(|i| i.reference_response.clone())
        .unwrap_or_default();

    let category = input.and_then(|i| i.category.clone());

    let responses = raw
        .model_responses
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|r| r.response.clone().unwrap_or_default())
        .collect();

    NormalizedRecord::new(index, prompt, extract_metric(raw, metric_name), reference, responses)
        .with_category(category)
}

/// 指標名が一致する最初のスコアを取り出す
pub fn extract_metric(raw: &RawRecord, metric_name: &str) -> Option<f64> {
    raw.automated_evaluation_result
        .as_ref()?
        .scores
        .iter()
        .find(|s| s.metric_name.as_deref() == Some(metric_name))
        .and_then(|s| s.result)
}

/// コレクション全体を正規化する（IDは入力順）
pub fn build_index(raws: &[RawRecord], metric_name: &str) -> Vec<NormalizedRecord> {
    raws.iter()
        .enumerate()
        .map(|(i, raw)| normalize(raw, i, metric_name))
        .collect()
}

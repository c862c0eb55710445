//! 評価レコードの型定義
//!
//! - RawRecord: JSONLの1行（評価ジョブの出力そのまま）
//! - NormalizedRecord: 照合・差分計算に使う正規化済みビュー

use serde::{Deserialize, Serialize};

/// 評価ジョブ出力の1レコード
///
/// どのフィールドも欠損を許容する。欠損時の既定値は
/// [`crate::record::normalize`] が決める。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub input_record: Option<InputRecord>,
    pub automated_evaluation_result: Option<EvaluationResult>,
    pub model_responses: Option<Vec<ModelResponse>>,
}

/// 入力プロンプト部
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputRecord {
    pub prompt: Option<String>,
    pub reference_response: Option<String>,
    pub category: Option<String>,
}

/// 自動評価結果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationResult {
    pub scores: Vec<MetricScore>,
}

/// 指標ごとのスコア
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricScore {
    pub metric_name: Option<String>,
    pub result: Option<f64>,
}

/// モデル応答
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelResponse {
    pub response: Option<String>,
}

/// 正規化済みレコード
///
/// 構築後は変更しない。フィールドはアクセサ経由でのみ読める。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    id: usize,
    prompt: String,
    metric: Option<f64>,
    reference: String,
    responses: Vec<String>,
    category: Option<String>,
}

impl NormalizedRecord {
    pub fn new(
        id: usize,
        prompt: impl Into<String>,
        metric: Option<f64>,
        reference: impl Into<String>,
        responses: Vec<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            metric,
            reference: reference.into(),
            responses,
            category: None,
        }
    }

    /// カテゴリ付きで構築
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// コレクション内の0始まりの位置
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// 追跡対象指標の値（0〜1）
    pub fn metric(&self) -> Option<f64> {
        self.metric
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_full() {
        let json = r#"{
            "inputRecord": {"prompt": "Q?", "referenceResponse": "A", "category": "geo"},
            "automatedEvaluationResult": {"scores": [{"metricName": "Toxicity", "result": 0.25}]},
            "modelResponses": [{"response": "answer"}]
        }"#;
        let raw: RawRecord = serde_json::from_str(json).unwrap();

        let input = raw.input_record.unwrap();
        assert_eq!(input.prompt.as_deref(), Some("Q?"));
        assert_eq!(input.reference_response.as_deref(), Some("A"));
        assert_eq!(input.category.as_deref(), Some("geo"));

        let scores = raw.automated_evaluation_result.unwrap().scores;
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].metric_name.as_deref(), Some("Toxicity"));
        assert_eq!(scores[0].result, Some(0.25));

        assert_eq!(raw.model_responses.unwrap()[0].response.as_deref(), Some("answer"));
    }

    #[test]
    fn test_raw_record_empty_object() {
        let raw: RawRecord = serde_json::from_str("{}").unwrap();
        assert!(raw.input_record.is_none());
        assert!(raw.automated_evaluation_result.is_none());
        assert!(raw.model_responses.is_none());
    }

    #[test]
    fn test_raw_record_null_result() {
        let json = r#"{"automatedEvaluationResult": {"scores": [{"metricName": "Toxicity", "result": null}]}}"#;
        let raw: RawRecord = serde_json::from_str(json).unwrap();
        let scores = raw.automated_evaluation_result.unwrap().scores;
        assert!(scores[0].result.is_none());
    }

    #[test]
    fn test_normalized_record_accessors() {
        let record = NormalizedRecord::new(3, "prompt", Some(0.5), "ref", vec!["r1".into()])
            .with_category(Some("cat".into()));
        assert_eq!(record.id(), 3);
        assert_eq!(record.prompt(), "prompt");
        assert_eq!(record.metric(), Some(0.5));
        assert_eq!(record.reference(), "ref");
        assert_eq!(record.responses(), &["r1".to_string()]);
        assert_eq!(record.category(), Some("cat"));
    }
}

//! 完全一致プロンプトでの複数指標比較テスト

use eval_align::commands;
use eval_align_common::DEFAULT_TRACKED_METRICS;
use tempfile::tempdir;

fn line(prompt: &str, scores: &[(&str, f64)]) -> String {
    let scores: Vec<serde_json::Value> = scores
        .iter()
        .map(|(name, value)| serde_json::json!({"metricName": name, "result": value}))
        .collect();
    serde_json::json!({
        "inputRecord": {"prompt": prompt},
        "automatedEvaluationResult": {"scores": scores}
    })
    .to_string()
}

fn tracked() -> Vec<String> {
    DEFAULT_TRACKED_METRICS.iter().map(|m| m.to_string()).collect()
}

#[test]
fn test_run_metrics_average_differences() {
    let dir = tempdir().expect("Failed to create temp dir");
    let left = dir.path().join("left.jsonl");
    let right = dir.path().join("right.jsonl");
    std::fs::write(
        &left,
        [
            line("q1", &[("Accuracy", 0.4), ("Toxicity", 0.1), ("Robustness", 0.5)]),
            line("q2", &[("Accuracy", 0.6), ("Toxicity", 0.3)]),
            "broken line".to_string(),
        ]
        .join("\n"),
    )
    .unwrap();
    std::fs::write(
        &right,
        [
            line("q2", &[("Accuracy", 0.8), ("Toxicity", 0.1)]),
            line("q1", &[("Accuracy", 0.6), ("Toxicity", 0.3), ("Robustness", 0.5)]),
            line("q3", &[("Accuracy", 1.0)]),
        ]
        .join("\n"),
    )
    .unwrap();

    let mut out = Vec::new();
    let comparison = commands::run_metrics(&left, &right, &tracked(), 5, None, &mut out).unwrap();

    assert_eq!(comparison.common_prompts(), 2);
    assert!((comparison.average_differences["Accuracy"] - 0.2).abs() < 1e-9);
    assert!(comparison.average_differences["Toxicity"].abs() < 1e-9);
    assert!(comparison.average_differences["Robustness"].abs() < 1e-9);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("共通プロンプト: 2 件"));
    assert!(text.contains("Accuracy: 0.2000"));
}

#[test]
fn test_run_metrics_json_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let left = dir.path().join("left.jsonl");
    let right = dir.path().join("right.jsonl");
    std::fs::write(&left, line("q", &[("Toxicity", 0.2)])).unwrap();
    std::fs::write(&right, line("q", &[("Toxicity", 0.5)])).unwrap();

    let mut out = Vec::new();
    commands::run_metrics(&left, &right, &tracked(), 5, Some(dir.path()), &mut out).unwrap();

    let path = dir.path().join("metric-comparison.json");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("JSONが出力されていない")).unwrap();
    assert!((value["average_differences"]["Toxicity"].as_f64().unwrap() - 0.3).abs() < 1e-9);
    assert_eq!(value["prompt_level_comparison"][0]["prompt"], "q");
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eval-align")]
#[command(about = "評価ジョブ出力の類似プロンプト照合・指標差分ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 2つのJSONLを類似プロンプトで照合し、指標の差を比較
    Align {
        /// 左（比較元）のJSONLファイル
        #[arg(required = true)]
        left: PathBuf,

        /// 右（比較先）のJSONLファイル
        #[arg(required = true)]
        right: PathBuf,

        /// 類似度の閾値 0-100（解釈できなければ70）
        #[arg(allow_negative_numbers = true)]
        threshold: Option<String>,

        /// 追跡する指標名（デフォルト: 設定値 / Toxicity）
        #[arg(short, long)]
        metric: Option<String>,

        /// 類似度スコアラ (partial/ratio)
        #[arg(long)]
        scorer: Option<String>,

        /// 出力形式 (text/json/both)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// JSON出力先（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// モデル応答・参照回答の表示を省略
        #[arg(long)]
        no_responses: bool,

        /// 候補探索を並列化
        #[arg(long)]
        parallel: bool,
    },

    /// 完全一致プロンプトで複数指標の平均差を比較
    Metrics {
        /// 左（比較元）のJSONLファイル
        #[arg(required = true)]
        left: PathBuf,

        /// 右（比較先）のJSONLファイル
        #[arg(required = true)]
        right: PathBuf,

        /// 比較する指標名（複数指定可、デフォルト: 設定値）
        #[arg(short, long)]
        metric: Vec<String>,

        /// 表示するプロンプト数
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// JSON出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 既定の閾値を設定
        #[arg(long)]
        set_threshold: Option<u8>,

        /// 追跡する指標名を設定
        #[arg(long)]
        set_metric: Option<String>,

        /// 類似度スコアラを設定 (partial/ratio)
        #[arg(long)]
        set_scorer: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(&self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "both" => Ok(OutputFormat::Both),
            _ => Err(format!("Unknown format: {}. Use text, json, or both", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Both => write!(f, "both"),
        }
    }
}

use crate::error::{EvalAlignError, Result};
use eval_align_common::{Scorer, Threshold, DEFAULT_METRIC_NAME, DEFAULT_TRACKED_METRICS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// 追跡指標名を上書きする環境変数
pub const METRIC_ENV_VAR: &str = "EVAL_ALIGN_METRIC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_threshold: Threshold,
    pub metric_name: String,
    pub tracked_metrics: Vec<String>,
    pub scorer: Scorer,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_threshold: Threshold::DEFAULT,
            metric_name: DEFAULT_METRIC_NAME.into(),
            tracked_metrics: DEFAULT_TRACKED_METRICS.iter().map(|m| m.to_string()).collect(),
            scorer: Scorer::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 読み込めなければ警告して既定値を返す（壊れた設定を上書き修復するため）
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(e) => {
                warn!(error = %e, "設定ファイルの場所を特定できません。既定値を使います");
                Self::default()
            }
        }
    }

    pub fn load_from_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "設定ファイルを読み込めません。既定値を使います");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvalAlignError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("eval-align").join("config.json"))
    }

    /// 追跡指標名（環境変数を優先）
    pub fn metric_name(&self) -> String {
        match std::env::var(METRIC_ENV_VAR) {
            Ok(name) if !name.trim().is_empty() => name,
            _ => self.metric_name.clone(),
        }
    }

    pub fn set_threshold(&mut self, value: u8) -> Result<()> {
        self.default_threshold = Threshold::new(value)?;
        Ok(())
    }
}

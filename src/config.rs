use crate::error::{ReportError, Result};
use inspection_report_common::layout::{JPEG_QUALITY, PREVIEW_PADDING, RASTER_SCALE, SLIDE_WIDTH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// APIキーの環境変数（設定ファイルより優先）
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    /// プレビュー切替後、レイアウト完了通知を待つ上限
    pub settle_delay_ms: u64,
    /// プレビュー領域の幅（倍率計算用）
    pub preview_width: f32,
    pub preview_padding: f32,
    pub raster_scale: f32,
    pub jpeg_quality: u8,
    /// 出力ファイル名の接頭辞
    pub file_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            timeout_seconds: 120,
            settle_delay_ms: 500,
            preview_width: SLIDE_WIDTH + PREVIEW_PADDING,
            preview_padding: PREVIEW_PADDING,
            raster_scale: RASTER_SCALE,
            jpeg_quality: JPEG_QUALITY,
            file_prefix: "Audit".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("inspection-report").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ReportError::Config(format!(
                "jpeg_quality は1-100で指定してください: {}",
                self.jpeg_quality
            )));
        }
        if !(self.raster_scale > 0.0 && self.raster_scale <= 4.0) {
            return Err(ReportError::Config(format!(
                "raster_scale は0より大きく4以下で指定してください: {}",
                self.raster_scale
            )));
        }
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(ReportError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.raster_scale, 2.0);
        assert_eq!(config.file_prefix, "Audit");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "custom-model"}"#).unwrap();
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let config = Config {
            jpeg_quality: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));
    }
}

//! 编辑器配置
//!
//! 可从 JSON 加载，缺省字段取默认值。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{0}': must be positive")]
    NotPositive(&'static str),
}

/// 编辑器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 网格显示间距
    pub grid_spacing: f64,
    /// 捕捉间距
    pub snap_spacing: f64,
    /// 是否启用网格捕捉
    pub snap_enabled: bool,
    /// 是否显示网格
    pub grid_visible: bool,
    /// 是否为三维视图
    pub view_3d: bool,
    /// 构件拾取容差（世界单位）
    pub member_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 1.0,
            snap_spacing: 0.5,
            snap_enabled: true,
            grid_visible: true,
            view_3d: false,
            member_tolerance: 0.3,
        }
    }
}

impl EditorConfig {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_spacing <= 0.0 {
            return Err(ConfigError::NotPositive("grid_spacing"));
        }
        if self.snap_spacing <= 0.0 {
            return Err(ConfigError::NotPositive("snap_spacing"));
        }
        if self.member_tolerance <= 0.0 {
            return Err(ConfigError::NotPositive("member_tolerance"));
        }
        Ok(())
    }
}

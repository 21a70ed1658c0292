//! # Config 模块
//!
//! 补间组配置：由补间组创建的补间所使用的默认值。
//!
//! 配置可以来自代码，也可以来自 JSON 文件：
//!
//! ```json
//! { "default_easing": "linear", "default_delay": 0.1 }
//! ```
//!
//! 缺省字段使用默认值（`quadout`，无延迟）。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::easing::EasingFunction;

/// 补间组配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// 新补间的缓动函数
    #[serde(default)]
    pub default_easing: EasingFunction,

    /// 新补间的开始延迟（秒）
    #[serde(default = "default_delay")]
    pub default_delay: f64,
}

fn default_delay() -> f64 {
    0.0
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            default_easing: EasingFunction::default(),
            default_delay: default_delay(),
        }
    }
}

impl GroupConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在、解析失败或验证失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "补间配置文件不存在，使用默认配置");
            return Self::default();
        }

        let loaded = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|content| Self::from_json(&content));

        match loaded {
            Ok(config) => {
                debug!(path = %path.display(), "补间配置加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "补间配置无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_delay.is_finite() || self.default_delay < 0.0 {
            return Err(ConfigError::Validation(format!(
                "default_delay 必须是非负有限数值，实际为 {}",
                self.default_delay
            )));
        }
        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 序列化/反序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GroupConfig::default();
        assert_eq!(config.default_easing, EasingFunction::QuadOut);
        assert_eq!(config.default_delay, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GroupConfig::from_json(r#"{ "default_easing": "linear" }"#).unwrap();
        assert_eq!(config.default_easing, EasingFunction::Linear);
        assert_eq!(config.default_delay, 0.0);

        let config = GroupConfig::from_json("{}").unwrap();
        assert_eq!(config, GroupConfig::default());
    }

    #[test]
    fn test_unknown_easing_rejected() {
        let result = GroupConfig::from_json(r#"{ "default_easing": "bogus" }"#);
        assert!(matches!(result, Err(ConfigError::Serialization(_))));
    }

    #[test]
    fn test_config_validation() {
        let mut config = GroupConfig::default();

        config.default_delay = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.default_delay = f64::NAN;
        assert!(config.validate().is_err());

        config.default_delay = 0.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tween.json");

        let config = GroupConfig {
            default_easing: EasingFunction::SineInOut,
            default_delay: 0.25,
        };
        config.save(&path).unwrap();

        assert_eq!(GroupConfig::load(&path), config);
    }

    #[test]
    fn test_load_fallbacks() {
        let dir = tempfile::tempdir().unwrap();

        // 文件不存在
        let missing = dir.path().join("missing.json");
        assert_eq!(GroupConfig::load(&missing), GroupConfig::default());

        // 解析失败
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(GroupConfig::load(&broken), GroupConfig::default());

        // 验证失败
        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "default_delay": -2.0 }"#).unwrap();
        assert_eq!(GroupConfig::load(&invalid), GroupConfig::default());
    }
}

//! 计数配置 - 通过JSON文件调整参数

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::detection::category::{coco_label, DEFAULT_COUNT_CLASSES};
use crate::detection::{CategoryId, CategoryTable, FrameGeometry};
use crate::error::{CounterError, Result};

/// 计数系统参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    // === 检测参数 ===
    pub confidence_threshold: f32, // 检测置信度阈值

    // === 跟踪参数 ===
    pub max_disappeared: u32, // 最大丢失帧数
    pub max_distance: f32,    // 最大匹配距离(像素)

    // === 计数参数 ===
    pub line_position: f64, // 计数线位置 (0.0-1.0, 距画面顶部的比例)
    pub skip_frames: u32,   // 每 skip_frames+1 帧处理一帧

    // === 默认帧尺寸 (数据源未提供时使用) ===
    pub frame_width: u32,
    pub frame_height: u32,

    // === 计数类别 ===
    pub count_classes: BTreeMap<CategoryId, String>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        let count_classes = DEFAULT_COUNT_CLASSES
            .iter()
            .map(|&id| (id, coco_label(id).unwrap_or_default().to_string()))
            .collect();

        Self {
            confidence_threshold: 0.5,
            max_disappeared: 50,
            max_distance: 50.0,
            line_position: 0.5,
            skip_frames: 2,
            frame_width: 1280,
            frame_height: 720,
            count_classes,
        }
    }
}

impl CounterConfig {
    /// 从JSON文件加载配置, 文件不存在时写出默认配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("📝 配置文件不存在,创建默认配置...");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!("✅ 配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("💾 配置已保存到 {}", path.display());
        Ok(())
    }

    /// 参数校验
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(CounterError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.max_disappeared == 0 {
            return Err(CounterError::config("max_disappeared must be positive"));
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            return Err(CounterError::config(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(0.0..=1.0).contains(&self.line_position) {
            return Err(CounterError::config(format!(
                "line_position must be within [0, 1], got {}",
                self.line_position
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(CounterError::config("frame size must be non-zero"));
        }
        if self.count_classes.is_empty() {
            return Err(CounterError::config("count_classes must not be empty"));
        }
        Ok(())
    }

    pub fn categories(&self) -> Result<CategoryTable> {
        CategoryTable::new(self.count_classes.clone())
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.frame_width, self.frame_height)
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        info!("🎛️  当前计数配置:");
        info!("  检测置信度: {:.2}", self.confidence_threshold);
        info!(
            "  最大丢失帧: {} | 最大匹配距离: {:.1}px",
            self.max_disappeared, self.max_distance
        );
        info!(
            "  计数线位置: {:.2} | 跳帧: {}",
            self.line_position, self.skip_frames
        );
        let labels: Vec<&str> = self.count_classes.values().map(String::as_str).collect();
        info!("  计数类别: {}", labels.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "counter-config-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = CounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.count_classes.get(&2).map(String::as_str), Some("car"));
        assert_eq!(config.geometry(), FrameGeometry::new(1280, 720));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = CounterConfig::default();
        config.max_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.max_disappeared = 0;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.line_position = 1.5;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.count_classes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_writes_default() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);
        let config = CounterConfig::load(&path).unwrap();
        assert_eq!(config, CounterConfig::default());
        assert!(path.exists());

        let reloaded = CounterConfig::load(&path).unwrap();
        assert_eq!(reloaded, config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"max_distance": 80.0, "count_classes": {"0": "odam"}}"#).unwrap();
        let config = CounterConfig::load(&path).unwrap();
        assert_eq!(config.max_distance, 80.0);
        assert_eq!(config.max_disappeared, 50);
        assert_eq!(config.categories().unwrap().label(0), Some("odam"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = temp_path("malformed");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CounterConfig::load(&path),
            Err(CounterError::Json(_))
        ));
        let _ = fs::remove_file(&path);
    }
}

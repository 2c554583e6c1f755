//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `UpscaleConfig`，保证运行时行为可观测、可调整、可测试。
//! 资源上限在解码前后与放大前各检查一次，避免超大输入或超大倍率拖垮进程。
//!
//! ## 实现思路
//!
//! - `Default` 提供开箱可用的配置（默认倍率 2、PNG、质量 0.95）。
//! - 通过 `serde` 持久化为 JSON，缺失字段回落到默认值（见 `crate::settings`）。
//! - `validate` 拒绝明显不合理的上限组合。

use serde::{Deserialize, Serialize};

use super::{ExportFormat, QualityLevel, UpscaleError};

/// 快捷倍率按钮对应的预设值。
pub const SCALE_PRESETS: [u32; 5] = [2, 3, 4, 5, 10];

/// 放大器配置。
///
/// 字段覆盖了加载、解码、放大、导出四个阶段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscaleConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 放大结果的像素上限。
    pub max_output_pixels: u64,
    /// 新会话的初始倍率。
    pub default_scale: u32,
    /// 新会话的初始导出格式。
    pub default_format: ExportFormat,
    /// 新会话的初始质量。
    pub default_quality: QualityLevel,
    /// 放大结果缓存条数。
    pub render_cache_entries: usize,
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_output_pixels: 256_000_000,
            default_scale: 2,
            default_format: ExportFormat::Png,
            default_quality: QualityLevel::DEFAULT,
            render_cache_entries: 8,
        }
    }
}

impl UpscaleConfig {
    /// 校验配置合法性。
    pub fn validate(&self) -> Result<(), UpscaleError> {
        if self.max_file_size == 0 {
            return Err(UpscaleError::InvalidFormat("max_file_size 必须大于 0".to_string()));
        }
        if self.max_decoded_pixels == 0 || self.max_output_pixels == 0 {
            return Err(UpscaleError::InvalidFormat("像素上限必须大于 0".to_string()));
        }
        if self.max_decoded_bytes < 4 {
            return Err(UpscaleError::InvalidFormat(
                "max_decoded_bytes 至少要容纳一个 RGBA 像素".to_string(),
            ));
        }
        if self.default_scale == 0 {
            return Err(UpscaleError::InvalidFactor("default_scale 必须 >= 1".to_string()));
        }
        if self.render_cache_entries == 0 {
            return Err(UpscaleError::InvalidFormat("render_cache_entries 必须大于 0".to_string()));
        }
        Ok(())
    }
}

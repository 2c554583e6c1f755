//! # 导出格式与质量
//!
//! 导出格式是封闭集合：无损（PNG）与有损（JPEG）。
//! 质量参数只对有损格式有意义，无损格式下被忽略，UI 层据此禁用质量输入框。

use serde::{Deserialize, Serialize};

use super::UpscaleError;

/// 导出格式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// 无损：解码结果与原表面逐字节一致。
    #[default]
    Png,
    /// 有损：质量参数控制体积与保真度，丢弃 alpha 通道。
    Jpeg,
}

impl ExportFormat {
    /// 从外部字符串解析格式，同时接受扩展名与 MIME 类型。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_upscaler::upscaler::ExportFormat;
    ///
    /// assert_eq!(ExportFormat::from_str("image/png")?, ExportFormat::Png);
    /// assert_eq!(ExportFormat::from_str("JPG")?, ExportFormat::Jpeg);
    /// # Ok::<(), pixel_upscaler::upscaler::UpscaleError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(format: &str) -> Result<Self, UpscaleError> {
        match format.trim().to_lowercase().as_str() {
            "png" | "image/png" => Ok(Self::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(Self::Jpeg),
            other => Err(UpscaleError::InvalidFormat(format!(
                "未知导出格式：{}（可选：png / jpeg）",
                other
            ))),
        }
    }

    /// 稳定字符串，供前端展示与持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// 导出文件扩展名（不含点）。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Png)
    }

    /// 质量输入是否可用。
    pub fn accepts_quality(self) -> bool {
        !self.is_lossless()
    }
}

/// 有损编码质量，取值 `[0, 1]`。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityLevel(f32);

impl QualityLevel {
    pub const DEFAULT: QualityLevel = QualityLevel(0.95);

    /// 宽松构建：非有限值或 0 回退默认值，其余夹取到 `[0, 1]`。
    ///
    /// 与输入框行为一致：空值 / 非数字 / 0 都视为“未指定”。
    pub fn clamped(value: f64) -> Self {
        if !value.is_finite() || value == 0.0 {
            return Self::DEFAULT;
        }
        Self(value.clamp(0.0, 1.0) as f32)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// 映射到编码器的 1~100 质量刻度。
    pub(crate) fn to_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for QualityLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

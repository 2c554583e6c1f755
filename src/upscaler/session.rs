//! # 会话状态
//!
//! ## 设计思路
//!
//! `Session` 是预览控制器唯一的可变状态：当前源图、倍率、导出格式、质量与文件名前缀。
//! 以显式对象的形式由控制器持有，而非全局变量，便于脱离 UI 做单元测试。
//!
//! 状态只有两种：`Empty`（未加载）与 `Loaded`（已加载），没有终止态。

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{ExportFormat, PixelSurface, QualityLevel, ScaleFactor, UpscaleConfig};

/// 未提供名称（或清洗后为空）时使用的文件名前缀。
pub const DEFAULT_NAME_STEM: &str = "image";

static TRAILING_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[^.]+$").expect("valid extension regex"));

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("valid name regex"));

/// 由输入名称推导导出文件名前缀：去掉末尾扩展名，再把每段非 `[A-Za-z0-9_-]` 字符替换为一个 `_`。
///
/// # 示例
/// ```rust
/// use pixel_upscaler::upscaler::sanitize_name_stem;
///
/// assert_eq!(sanitize_name_stem("My Photo!.png"), "My_Photo_");
/// assert_eq!(sanitize_name_stem(""), "image");
/// ```
pub fn sanitize_name_stem(name: &str) -> String {
    let without_extension = TRAILING_EXTENSION.replace(name, "");
    let stem = UNSAFE_NAME_CHARS.replace_all(&without_extension, "_");
    if stem.is_empty() {
        DEFAULT_NAME_STEM.to_string()
    } else {
        stem.into_owned()
    }
}

/// 导出文件名：`{stem}_x{factor}.{ext}`。
pub fn export_file_name(stem: &str, factor: ScaleFactor, format: ExportFormat) -> String {
    format!("{}_x{}.{}", stem, factor, format.extension())
}

/// 会话所处状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Empty,
    Loaded,
}

/// 预览控制器持有的会话。
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) source: Option<Arc<PixelSurface>>,
    /// 源图代号，用作放大缓存的键。
    pub(crate) generation: u64,
    pub(crate) factor: ScaleFactor,
    pub(crate) format: ExportFormat,
    pub(crate) quality: QualityLevel,
    pub(crate) name_stem: String,
}

impl Session {
    pub fn new(config: &UpscaleConfig) -> Self {
        Self {
            source: None,
            generation: 0,
            factor: ScaleFactor::clamped(config.default_scale as f64),
            format: config.default_format,
            quality: config.default_quality,
            name_stem: DEFAULT_NAME_STEM.to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.source.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Empty
        }
    }

    pub fn source(&self) -> Option<&Arc<PixelSurface>> {
        self.source.as_ref()
    }

    pub fn factor(&self) -> ScaleFactor {
        self.factor
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }

    pub fn name_stem(&self) -> &str {
        &self.name_stem
    }

    /// 当前格式下质量输入框是否可用。
    pub fn quality_input_enabled(&self) -> bool {
        self.format.accepts_quality()
    }

    /// 以当前参数生成导出文件名。
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.name_stem, self.factor, self.format)
    }

    /// 当前参数对应的状态栏信息；未加载时尺寸全为 0。
    pub fn status(&self) -> PreviewStatus {
        let (width, height) = self
            .source
            .as_ref()
            .map(|s| s.dimensions())
            .unwrap_or((0, 0));
        PreviewStatus::new(width, height, self.factor)
    }

    /// 替换源图（仅在解码成功后调用）。`generation` 由控制器分配，保证全局唯一。
    pub(crate) fn replace_source(&mut self, surface: PixelSurface, name: &str, generation: u64) {
        self.source = Some(Arc::new(surface));
        self.generation = generation;
        self.name_stem = sanitize_name_stem(name);
    }
}

/// 状态栏信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewStatus {
    pub input_width: u32,
    pub input_height: u32,
    pub factor: u32,
    pub output_width: u64,
    pub output_height: u64,
}

impl PreviewStatus {
    pub fn new(width: u32, height: u32, factor: ScaleFactor) -> Self {
        Self {
            input_width: width,
            input_height: height,
            factor: factor.get(),
            output_width: width as u64 * factor.get() as u64,
            output_height: height as u64 * factor.get() as u64,
        }
    }
}

impl fmt::Display for PreviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "input: {}×{}px / factor: {} / output: {}×{}px",
            self.input_width, self.input_height, self.factor, self.output_width, self.output_height
        )
    }
}

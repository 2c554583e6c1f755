//! # 编码模块
//!
//! 把表面序列化为导出格式的字节流，比特流本身交给 `image` 自带的编码器。
//! - PNG：RGBA8 无损，忽略质量参数
//! - JPEG：RGB8 有损，质量 `[0, 1]` 映射到 1~100，未指定时取 0.95

use std::io::Cursor;
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{ExportFormat, PixelSurface, QualityLevel, UpscaleError};

/// 编码表面。空表面（宽或高为 0）直接拒绝。
///
/// # 示例
/// ```rust
/// use pixel_upscaler::upscaler::{encoder, ExportFormat, PixelSurface};
///
/// let surface = PixelSurface::from_rgba(1, 1, vec![255, 0, 0, 255])?;
/// let png = encoder::encode(&surface, ExportFormat::Png, None)?;
/// assert!(png.starts_with(b"\x89PNG"));
/// # Ok::<(), pixel_upscaler::upscaler::UpscaleError>(())
/// ```
pub fn encode(
    surface: &PixelSurface,
    format: ExportFormat,
    quality: Option<QualityLevel>,
) -> Result<Vec<u8>, UpscaleError> {
    if surface.is_empty() {
        return Err(UpscaleError::Encode(format!(
            "无法编码空图像：{}x{}",
            surface.width(),
            surface.height()
        )));
    }

    let started = Instant::now();
    let bytes = match format {
        ExportFormat::Png => encode_png(surface)?,
        ExportFormat::Jpeg => encode_jpeg(surface, quality.unwrap_or_default())?,
    };

    log::info!(
        "✅ 编码完成 - 格式: {} 尺寸: {}x{} 输出: {}KB 耗时: {}ms",
        format.as_str(),
        surface.width(),
        surface.height(),
        bytes.len() / 1024,
        started.elapsed().as_millis()
    );

    Ok(bytes)
}

fn encode_png(surface: &PixelSurface) -> Result<Vec<u8>, UpscaleError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(Cursor::new(&mut buffer));
    encoder
        .write_image(
            surface.as_bytes(),
            surface.width(),
            surface.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| UpscaleError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(buffer)
}

fn encode_jpeg(surface: &PixelSurface, quality: QualityLevel) -> Result<Vec<u8>, UpscaleError> {
    let rgb = surface.to_rgb_bytes();

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality.to_percent());
    encoder
        .write_image(&rgb, surface.width(), surface.height(), ExtendedColorType::Rgb8)
        .map_err(|e| UpscaleError::Encode(format!("JPEG 编码失败：{}", e)))?;
    Ok(buffer)
}

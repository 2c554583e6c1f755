//! # 解码模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA 表面”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//! 编解码本身交给 `image` 库，这里只负责限制与表面构建。
//!
//! ## 实现思路
//!
//! 1. 体积上限与魔数签名（所有加载入口共用）
//! 2. 猜测格式并读取 header 尺寸
//! 3. 按像素 / 内存上限快速拒绝
//! 4. 完整解码
//! 5. 转换 RGBA，并校验字节长度一致性

use std::io::Cursor;
use std::time::Instant;

use image::{GenericImageView, ImageReader};

use super::{PixelSurface, UpscaleConfig, UpscaleError};

/// 使用默认资源上限解码。
///
/// # 示例
/// ```rust,no_run
/// use pixel_upscaler::upscaler::decoder;
///
/// let bytes = std::fs::read("sprite.png").unwrap();
/// let surface = decoder::decode(&bytes)?;
/// println!("{}x{}", surface.width(), surface.height());
/// # Ok::<(), pixel_upscaler::upscaler::UpscaleError>(())
/// ```
pub fn decode(bytes: &[u8]) -> Result<PixelSurface, UpscaleError> {
    decode_with_limits(bytes, &UpscaleConfig::default())
}

/// 按配置中的像素与内存上限解码为 RGBA 表面。
pub fn decode_with_limits(bytes: &[u8], config: &UpscaleConfig) -> Result<PixelSurface, UpscaleError> {
    let started = Instant::now();

    validate_input_size(config, bytes.len() as u64)?;
    validate_image_signature(bytes)?;

    let format = image::guess_format(bytes)
        .map_err(|e| UpscaleError::Decode(format!("不支持的图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions(bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| UpscaleError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(UpscaleError::Decode(format!("图片尺寸无效：{}x{}", width, height)));
    }
    validate_pixel_limits(config, width, height)?;
    validate_decoded_memory_limits(config, width, height)?;

    let surface = PixelSurface::try_from(decoded)?;

    log::info!(
        "✅ 图片解码成功 - 格式: {:?} 尺寸: {}x{} 耗时: {}ms",
        format,
        width,
        height,
        started.elapsed().as_millis()
    );

    Ok(surface)
}

pub(crate) fn validate_input_size(config: &UpscaleConfig, len: u64) -> Result<(), UpscaleError> {
    if len > config.max_file_size {
        return Err(UpscaleError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            len as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}

/// 魔数校验：识别为非图片类型时直接拒绝；无法识别时交给解码器判定。
fn validate_image_signature(bytes: &[u8]) -> Result<(), UpscaleError> {
    if bytes.is_empty() {
        return Err(UpscaleError::Decode("图片内容为空".to_string()));
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(UpscaleError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }
    }

    Ok(())
}

/// 仅通过图片头信息读取宽高。
fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), UpscaleError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| UpscaleError::Decode(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| UpscaleError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &UpscaleConfig, width: u32, height: u32) -> Result<(), UpscaleError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| UpscaleError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(UpscaleError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(
    config: &UpscaleConfig,
    width: u32,
    height: u32,
) -> Result<(), UpscaleError> {
    let estimated = (width as u64)
        .checked_mul(height as u64)
        .and_then(|pixels| pixels.checked_mul(PixelSurface::BYTES_PER_PIXEL as u64))
        .ok_or_else(|| UpscaleError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(UpscaleError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

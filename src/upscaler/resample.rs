//! # 最近邻放大模块
//!
//! ## 设计思路
//!
//! 只支持整数倍最近邻：目标像素 `(dx, dy)` 取源像素 `(dx / f, dy / f)`（整除），
//! 即每个源像素被复制成 `f x f` 的同色块。不插值、不混色，像素画边缘保持锐利。
//!
//! ## 实现思路
//!
//! 逐行处理：先把源行横向展开成一条目标行，再用 `copy_within` 把这一行复制 `f - 1` 次。
//! 整除保证目标坐标永远映射回 `[0, width) x [0, height)`。

use std::time::Instant;

use super::{PixelSurface, UpscaleError};

/// 整数放大倍率，恒 >= 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleFactor(u32);

impl ScaleFactor {
    pub const IDENTITY: ScaleFactor = ScaleFactor(1);

    /// 严格构建：0 视为无效倍率。
    pub fn new(factor: u32) -> Result<Self, UpscaleError> {
        if factor == 0 {
            return Err(UpscaleError::InvalidFactor("倍率必须 >= 1，实际为 0".to_string()));
        }
        Ok(Self(factor))
    }

    /// 严格构建：拒绝小数、非有限值与 < 1 的值。
    pub fn from_f64(factor: f64) -> Result<Self, UpscaleError> {
        if !factor.is_finite() || factor.fract() != 0.0 {
            return Err(UpscaleError::InvalidFactor(format!("倍率必须是整数，实际为 {}", factor)));
        }
        if factor < 1.0 || factor > u32::MAX as f64 {
            return Err(UpscaleError::InvalidFactor(format!(
                "倍率超出范围 [1, {}]：{}",
                u32::MAX,
                factor
            )));
        }
        Ok(Self(factor as u32))
    }

    /// 宽松构建（输入框策略）：向下取整，最小为 1；非数字按 1 处理。
    pub fn clamped(factor: f64) -> Self {
        if !factor.is_finite() {
            return Self::IDENTITY;
        }
        Self(factor.floor().clamp(1.0, u32::MAX as f64) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<u32> for ScaleFactor {
    type Error = UpscaleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScaleFactor> for u32 {
    fn from(factor: ScaleFactor) -> Self {
        factor.0
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 计算放大后的尺寸，溢出返回资源限制错误。
pub fn output_dimensions(width: u32, height: u32, factor: ScaleFactor) -> Result<(u32, u32), UpscaleError> {
    let scaled_width = width.checked_mul(factor.get());
    let scaled_height = height.checked_mul(factor.get());
    match (scaled_width, scaled_height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(UpscaleError::ResourceLimit(format!(
            "放大尺寸溢出：{}x{} x{}",
            width, height, factor
        ))),
    }
}

/// 只做尺寸与像素上限检查，不分配输出缓冲。
pub fn check_output_limit(
    width: u32,
    height: u32,
    factor: ScaleFactor,
    max_output_pixels: u64,
) -> Result<(u32, u32), UpscaleError> {
    let (dst_width, dst_height) = output_dimensions(width, height, factor)?;

    let output_pixels = dst_width as u64 * dst_height as u64;
    if output_pixels > max_output_pixels {
        return Err(UpscaleError::ResourceLimit(format!(
            "放大结果像素过大：{} 像素（限制：{} 像素）",
            output_pixels, max_output_pixels
        )));
    }

    Ok((dst_width, dst_height))
}

/// 不设输出像素上限的最近邻放大。
///
/// # 示例
/// ```rust
/// use pixel_upscaler::upscaler::{resample, PixelSurface, ScaleFactor};
///
/// let src = PixelSurface::from_rgba(1, 1, vec![9, 8, 7, 255])?;
/// let out = resample::scale(&src, ScaleFactor::new(3)?)?;
/// assert_eq!(out.dimensions(), (3, 3));
/// assert_eq!(out.pixel_at(2, 2), Some([9, 8, 7, 255]));
/// # Ok::<(), pixel_upscaler::upscaler::UpscaleError>(())
/// ```
pub fn scale(src: &PixelSurface, factor: ScaleFactor) -> Result<PixelSurface, UpscaleError> {
    scale_with_limit(src, factor, u64::MAX)
}

/// 以 `f64` 倍率放大，小数或 < 1 的倍率返回 `InvalidFactor`。
pub fn scale_by(src: &PixelSurface, factor: f64) -> Result<PixelSurface, UpscaleError> {
    scale(src, ScaleFactor::from_f64(factor)?)
}

/// 最近邻放大，输出像素数超过 `max_output_pixels` 时拒绝。
pub fn scale_with_limit(
    src: &PixelSurface,
    factor: ScaleFactor,
    max_output_pixels: u64,
) -> Result<PixelSurface, UpscaleError> {
    let started = Instant::now();
    let (src_width, src_height) = src.dimensions();
    let (dst_width, dst_height) = check_output_limit(src_width, src_height, factor, max_output_pixels)?;

    if factor == ScaleFactor::IDENTITY {
        return Ok(src.clone());
    }

    let f = factor.get() as usize;
    let dst_stride = dst_width as usize * PixelSurface::BYTES_PER_PIXEL;
    let total = PixelSurface::buffer_len(dst_width, dst_height)?;
    let mut pixels = vec![0u8; total];

    for sy in 0..src_height {
        let first_row_start = sy as usize * f * dst_stride;
        let first_row = first_row_start..first_row_start + dst_stride;
        expand_row(src.row(sy), &mut pixels[first_row.clone()], f);

        for repeat in 1..f {
            pixels.copy_within(first_row.clone(), first_row_start + repeat * dst_stride);
        }
    }

    let surface = PixelSurface::from_rgba(dst_width, dst_height, pixels)?;

    log::debug!(
        "🔍 最近邻放大：{}x{} -> {}x{}（x{}）耗时 {}ms",
        src_width,
        src_height,
        dst_width,
        dst_height,
        factor,
        started.elapsed().as_millis()
    );

    Ok(surface)
}

/// 把一行源像素横向展开为每像素重复 `factor` 次的目标行。
fn expand_row(source: &[u8], target: &mut [u8], factor: usize) {
    debug_assert_eq!(source.len() * factor, target.len());
    let mut chunks = target.chunks_exact_mut(PixelSurface::BYTES_PER_PIXEL);
    for pixel in source.chunks_exact(PixelSurface::BYTES_PER_PIXEL) {
        for _ in 0..factor {
            if let Some(slot) = chunks.next() {
                slot.copy_from_slice(pixel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_from_ids(width: u32, height: u32) -> PixelSurface {
        let data = (0..width * height)
            .flat_map(|i| [i as u8, (i * 3) as u8, 0, 255])
            .collect();
        PixelSurface::from_rgba(width, height, data).expect("valid surface")
    }

    #[test]
    fn replicates_each_pixel_into_block() {
        let src = surface_from_ids(3, 2);
        let out = scale(&src, ScaleFactor::new(4).unwrap()).unwrap();

        assert_eq!(out.dimensions(), (12, 8));
        for dy in 0..8 {
            for dx in 0..12 {
                assert_eq!(out.pixel_at(dx, dy), src.pixel_at(dx / 4, dy / 4));
            }
        }
    }

    #[test]
    fn identity_factor_is_bitwise_copy() {
        let src = surface_from_ids(5, 4);
        let out = scale(&src, ScaleFactor::IDENTITY).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn rejects_invalid_factors() {
        assert!(matches!(ScaleFactor::new(0), Err(UpscaleError::InvalidFactor(_))));
        let src = surface_from_ids(2, 2);
        assert!(matches!(scale_by(&src, 0.0), Err(UpscaleError::InvalidFactor(_))));
        assert!(matches!(scale_by(&src, -2.0), Err(UpscaleError::InvalidFactor(_))));
        assert!(matches!(scale_by(&src, 2.5), Err(UpscaleError::InvalidFactor(_))));
        assert!(matches!(scale_by(&src, f64::NAN), Err(UpscaleError::InvalidFactor(_))));
    }

    #[test]
    fn clamped_floors_and_enforces_minimum() {
        assert_eq!(ScaleFactor::clamped(0.0).get(), 1);
        assert_eq!(ScaleFactor::clamped(-7.0).get(), 1);
        assert_eq!(ScaleFactor::clamped(3.9).get(), 3);
        assert_eq!(ScaleFactor::clamped(f64::NAN).get(), 1);
    }

    #[test]
    fn output_limit_is_enforced() {
        let src = surface_from_ids(10, 10);
        let result = scale_with_limit(&src, ScaleFactor::new(10).unwrap(), 9_999);
        assert!(matches!(result, Err(UpscaleError::ResourceLimit(_))));
    }

    #[test]
    fn output_limit_check_allows_exact_boundary() {
        let factor = ScaleFactor::new(10).unwrap();
        assert_eq!(check_output_limit(10, 10, factor, 10_000).unwrap(), (100, 100));
        assert!(matches!(
            check_output_limit(10, 10, factor, 9_999),
            Err(UpscaleError::ResourceLimit(_))
        ));
    }

    #[test]
    fn dimension_overflow_is_reported() {
        let result = output_dimensions(u32::MAX, 1, ScaleFactor::new(2).unwrap());
        assert!(matches!(result, Err(UpscaleError::ResourceLimit(_))));
    }
}

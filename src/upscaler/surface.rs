//! # 像素表面
//!
//! `PixelSurface` 是整条流水线在各阶段之间传递的唯一像素载体：
//! 解码器产出、放大器产出、编码器消费。构建后不可变，变换总是产出新表面。

use image::DynamicImage;

use super::UpscaleError;

/// RGBA8 像素网格（行优先）。
///
/// 不变量：`data.len() == width * height * 4`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelSurface {
    /// 每像素字节数（RGBA8）。
    pub const BYTES_PER_PIXEL: usize = 4;

    /// 由原始 RGBA 字节构建表面，长度不匹配时拒绝。
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, UpscaleError> {
        let expected = Self::buffer_len(width, height)?;
        if data.len() != expected {
            return Err(UpscaleError::Decode(format!(
                "像素数据长度异常：{} 字节（期望 {}x{}x4 = {} 字节）",
                data.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// 0x0 的空表面，用于“未加载图片”状态的渲染。
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// 计算 `width * height * 4`，溢出时返回资源限制错误。
    pub(crate) fn buffer_len(width: u32, height: u32) -> Result<usize, UpscaleError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(Self::BYTES_PER_PIXEL))
            .ok_or_else(|| {
                UpscaleError::ResourceLimit(format!("图片尺寸 {}x{} 导致内存溢出风险", width, height))
            })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 行优先 RGBA 字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// 读取单个像素，越界返回 `None`。
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        let px = &self.data[offset..offset + Self::BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// 单行像素字节（`width * 4`）。
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * Self::BYTES_PER_PIXEL;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// 丢弃 alpha 的 RGB8 字节，直接从 RGBA 缓冲逐像素拷贝。
    pub(crate) fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.data.len() / Self::BYTES_PER_PIXEL * 3);
        for px in self.data.chunks_exact(Self::BYTES_PER_PIXEL) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }
}

impl TryFrom<DynamicImage> for PixelSurface {
    type Error = UpscaleError;

    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }
}

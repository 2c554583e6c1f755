//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（内存字节 / 本地文件 / Base64）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - 字节：原样交给解码器。
//! - 文件：存在性 + metadata 体积限制（读取前拒绝）+ 读取。
//! - Base64：格式解析 + 解码前体积估算。
//!
//! 体积上限与签名校验最终都由 `decoder::decode_with_limits` 统一执行，
//! 因此无论从哪个入口加载，同样的字节得到同样的错误。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::decoder::validate_input_size;
use super::source::RawImageData;
use super::{ImageSource, UpscaleConfig, UpscaleError};

/// 按来源加载原始字节。
pub(crate) fn load_source(source: ImageSource, config: &UpscaleConfig) -> Result<RawImageData, UpscaleError> {
    match source {
        ImageSource::Bytes { bytes, name } => Ok(RawImageData {
            bytes,
            name,
            source_hint: "bytes",
        }),
        ImageSource::FilePath(path) => load_from_file(&path, config),
        ImageSource::Base64 { data, name } => load_from_base64(&data, name, config),
    }
}

/// 从本地路径加载图片原始字节，文件名作为导出名来源。
fn load_from_file(path: &str, config: &UpscaleConfig) -> Result<RawImageData, UpscaleError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path);

    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(UpscaleError::FileSystem(format!("文件不存在：{}", path)));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| UpscaleError::FileSystem(format!("无法读取文件信息：{}", e)))?;
    validate_input_size(config, metadata.len())?;

    let bytes = std::fs::read(file_path)
        .map_err(|e| UpscaleError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(RawImageData {
        bytes,
        name,
        source_hint: "file",
    })
}

fn load_from_base64(data: &str, name: String, config: &UpscaleConfig) -> Result<RawImageData, UpscaleError> {
    log::info!("📝 开始处理 base64 图片");

    let bytes = parse_base64_with_limit(data, config.max_file_size)?;

    Ok(RawImageData {
        bytes,
        name,
        source_hint: "base64",
    })
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, UpscaleError> {
    let len = base64_data.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| UpscaleError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| UpscaleError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 解析 Data URL 或纯 Base64，解码前先按估算体积拒绝超限输入。
fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, UpscaleError> {
    let normalized = data.trim();

    let payload = if normalized.starts_with("data:") {
        let base64_start = normalized
            .find(";base64,")
            .ok_or_else(|| UpscaleError::Decode("Data URL 缺少 base64 标记".to_string()))?;
        &normalized[base64_start + 8..]
    } else {
        normalized
    };

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_file_size {
        return Err(UpscaleError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| UpscaleError::Decode(format!("Base64 解码失败：{}", e)))
}

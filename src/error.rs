//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，UI 绑定层的所有入口统一返回 `Result<T, AppError>`，
//! 前端通过 `Serialize` 获得结构化的错误信息。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `UpscaleError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串。

use serde::Serialize;

use crate::upscaler::UpscaleError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 放大流水线错误（加载 / 解码 / 放大 / 编码 / 导出）
    #[error("{0}")]
    Upscale(#[from] UpscaleError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件读写或解析失败
    #[error("设置错误: {0}")]
    Settings(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

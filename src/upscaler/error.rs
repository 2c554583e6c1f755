//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载“加载 → 解码 → 放大 → 编码 → 导出”整条链路的错误来源。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧（UI 绑定层）可按分支匹配，
//! 为每类错误给出不同的用户提示。

/// 放大流水线统一错误类型。
///
/// 任何失败都会原样返回给调用方，会话状态保持不变。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpscaleError {
    /// 输入字节无法识别、被截断或已损坏。
    #[error("解码错误：{0}")]
    Decode(String),

    /// 放大倍率不是 >= 1 的整数。
    #[error("倍率无效：{0}")]
    InvalidFactor(String),

    /// 表面为空或编码器执行失败。
    #[error("编码错误：{0}")]
    Encode(String),

    /// 尚未加载图片就请求导出。
    #[error("尚未加载图片")]
    NoImage,

    /// 导出格式名未知，或配置值非法。
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    /// 读取输入文件或写出导出文件失败。
    #[error("文件错误：{0}")]
    FileSystem(String),

    /// 像素数 / 内存估算 / 文件体积超出配置上限。
    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义（文件选择 / 拖放 / 粘贴）
//! - `RawImageData` 表示已加载但未解码的字节与其名称

/// 图片输入来源。
///
/// 三种取得方式最终都汇入 `PreviewController::load_image(bytes, name)`。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 已在内存中的字节（文件选择框 / 拖放）。
    Bytes { bytes: Vec<u8>, name: String },
    /// 本地文件路径来源。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串，剪贴板粘贴常见）。
    Base64 { data: String, name: String },
}

/// 加载阶段输出：原始字节与名称。
#[derive(Debug)]
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 用于推导导出文件名的原始名称。
    pub(crate) name: String,
    /// 来源提示（用于日志）。
    pub(crate) source_hint: &'static str,
}

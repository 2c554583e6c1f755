//! # 放大模块（upscaler）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载 → 解码 → 最近邻放大 → 编码 → 交给输出端”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `controller`：编排整条流水线并持有会话（唯一有状态的部分）
//! - `session`：会话状态、状态栏信息、文件名清洗
//! - `loader`：负责字节 / 文件 / Base64 加载与安全校验
//! - `decoder`：负责解码与像素 / 内存限制
//! - `resample`：整数倍最近邻放大
//! - `encoder`：PNG / JPEG 编码
//! - `sink`：导出结果的去向
//! - `config/error/format/source/surface`：配置、错误、格式、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! UI 适配层（文件选择 / 拖放 / 粘贴 / 倍率输入 / 下载按钮）
//!    ↓
//! controller.rs（会话 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 体积 / 签名校验）
//!    ├─ decoder.rs（解码 + 像素限制）
//!    ├─ resample.rs（最近邻放大，结果进 LRU 缓存）
//!    └─ encoder.rs（编码）→ sink.rs（输出端）
//!    ↓
//! 返回 UpscaleError 给调用方
//! ```

mod config;
mod controller;
pub mod decoder;
pub mod encoder;
mod error;
mod format;
mod loader;
pub mod resample;
mod session;
mod sink;
mod source;
mod surface;

pub use config::{SCALE_PRESETS, UpscaleConfig};
pub use controller::{ExportedImage, PreviewController, RenderedPreview};
pub use error::UpscaleError;
pub use format::{ExportFormat, QualityLevel};
pub use resample::ScaleFactor;
pub use session::{
    DEFAULT_NAME_STEM, PreviewStatus, Session, SessionState, export_file_name, sanitize_name_stem,
};
pub use sink::{DirectorySink, MemorySink, OutputSink};
pub use source::ImageSource;
pub use surface::PixelSurface;

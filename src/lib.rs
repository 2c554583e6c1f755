//! # 像素放大工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             UI 适配层（不在本库范围内）                   │
//! │  文件选择 / 拖放 / 粘贴 ── 倍率输入 ── 格式 / 质量 ── 下载 │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  ├─ settings ─── 配置 JSON 读写                           │
//! │  ├─ logging ──── env_logger 初始化                        │
//! │  └─ upscaler ─── 加载·解码·最近邻放大·编码·导出           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，UI 绑定层入口的返回类型 |
//! | [`settings`] | `UpscaleConfig` 的持久化 |
//! | [`logging`] | 日志初始化 |
//! | [`upscaler`] | 预览控制器与整条放大流水线 |

pub mod error;
pub mod logging;
pub mod settings;
pub mod upscaler;

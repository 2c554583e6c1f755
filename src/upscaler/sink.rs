//! # 输出端
//!
//! 导出结果（字节 + 文件名）的去向由调用方决定：保存到目录、交给浏览器下载、或留在内存中。
//! 核心只保证字节正确、文件名确定。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::UpscaleError;

/// 接收导出结果的外部协作者。
pub trait OutputSink: Send + Sync {
    fn deliver(&self, bytes: &[u8], file_name: &str) -> Result<(), UpscaleError>;
}

/// 写入指定目录的输出端。
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn deliver(&self, bytes: &[u8], file_name: &str) -> Result<(), UpscaleError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| UpscaleError::FileSystem(format!("创建导出目录失败：{}", e)))?;

        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| UpscaleError::FileSystem(format!("写入导出文件失败：{}", e)))?;

        log::info!("💾 已写出 {}（{}KB）", path.display(), bytes.len() / 1024);
        Ok(())
    }
}

/// 把导出结果收集在内存中的输出端。
#[derive(Debug, Default)]
pub struct MemorySink {
    exports: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出目前收到的全部导出（文件名, 字节）。
    pub fn take(&self) -> Result<Vec<(String, Vec<u8>)>, UpscaleError> {
        let mut guard = self
            .exports
            .lock()
            .map_err(|_| UpscaleError::ResourceLimit("导出缓冲锁已中毒".to_string()))?;
        Ok(std::mem::take(&mut *guard))
    }
}

impl OutputSink for MemorySink {
    fn deliver(&self, bytes: &[u8], file_name: &str) -> Result<(), UpscaleError> {
        self.exports
            .lock()
            .map_err(|_| UpscaleError::ResourceLimit("导出缓冲锁已中毒".to_string()))?
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

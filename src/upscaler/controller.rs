//! # 预览控制器（核心编排）
//!
//! ## 设计思路
//!
//! `PreviewController` 是唯一有状态的编排器，不直接与任何 UI 绑定。
//! 处理链路固定为：
//! 1. 加载原始字节（任意来源）
//! 2. 解码为 RGBA 表面（阻塞任务）
//! 3. 按当前倍率最近邻放大（带 LRU 缓存）
//! 4. 导出时编码（阻塞任务）并交给输出端
//!
//! ## 实现思路
//!
//! - 会话放在 `RwLock<Session>` 中，锁从不跨越 `.await` 持有。
//! - 解码 / 编码通过 `spawn_blocking` 作为一次性异步操作执行，不支持取消。
//! - 倍率切换先在会话快照上完成计算，成功后再提交，失败时会话保持原样。
//! - 解码成功即提交新源图；当前倍率超出输出像素上限时不报错，
//!   而是返回空输出并在 `output_error` 中说明。
//! - 并发的两次加载各自独立解码，最后提交者生效。
//! - 缓存只保留当前 generation 的放大结果，换图时整体清空。

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use lru::LruCache;

use super::session::{PreviewStatus, Session};
use super::sink::OutputSink;
use super::{
    decoder, encoder, loader, resample, ExportFormat, ImageSource, PixelSurface, QualityLevel,
    ScaleFactor, UpscaleConfig, UpscaleError,
};

type RenderKey = (u64, ScaleFactor);

/// 一次渲染的结果：原图、放大图与状态栏信息。
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    /// 未加载时为 `None`。
    pub source: Option<Arc<PixelSurface>>,
    /// 未加载时为 0x0 空表面。
    pub output: Arc<PixelSurface>,
    pub status: PreviewStatus,
    /// 当前倍率下无法生成输出时的原因（输出为空表面）。
    pub output_error: Option<UpscaleError>,
}

impl RenderedPreview {
    /// 状态栏文本：`input: W×Hpx / factor: N / output: W'×H'px`。
    pub fn status_text(&self) -> String {
        self.status.to_string()
    }
}

/// 导出结果：编码后的字节与建议文件名。
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub format: ExportFormat,
    pub mime_type: &'static str,
}

/// 预览控制器。
pub struct PreviewController {
    config: UpscaleConfig,
    session: RwLock<Session>,
    render_cache: Mutex<LruCache<RenderKey, Arc<PixelSurface>>>,
    next_generation: AtomicU64,
}

impl PreviewController {
    /// 根据配置创建控制器，初始会话为空。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_upscaler::upscaler::{PreviewController, UpscaleConfig};
    ///
    /// let controller = PreviewController::new(UpscaleConfig::default())?;
    /// let preview = controller.render()?;
    /// assert_eq!(preview.status_text(), "input: 0×0px / factor: 2 / output: 0×0px");
    /// # Ok::<(), pixel_upscaler::upscaler::UpscaleError>(())
    /// ```
    pub fn new(config: UpscaleConfig) -> Result<Self, UpscaleError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.render_cache_entries).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            session: RwLock::new(Session::new(&config)),
            render_cache: Mutex::new(LruCache::new(capacity)),
            next_generation: AtomicU64::new(1),
            config,
        })
    }

    pub fn config(&self) -> &UpscaleConfig {
        &self.config
    }

    /// 获取会话快照。
    pub fn session(&self) -> Result<Session, UpscaleError> {
        Ok(self.read_session()?.clone())
    }

    /// 加载图片：解码成功即替换源图并重新渲染；解码失败时会话不变。
    ///
    /// 保留当前倍率。若该倍率超出输出像素上限，加载依然成功，
    /// 返回的预览输出为空并带有 `output_error`。
    pub async fn load_image(&self, bytes: Vec<u8>, name: &str) -> Result<RenderedPreview, UpscaleError> {
        let total_start = Instant::now();
        let config = self.config.clone();

        let decode_start = Instant::now();
        let surface = tokio::task::spawn_blocking(move || decoder::decode_with_limits(&bytes, &config))
            .await
            .map_err(|e| UpscaleError::Decode(format!("解码任务异常终止：{}", e)))??;
        let decode_elapsed = decode_start.elapsed();

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let mut candidate = self.session()?;
        candidate.replace_source(surface, name, generation);

        {
            let mut session = self.write_session()?;
            session.source = candidate.source.clone();
            session.generation = candidate.generation;
            session.name_stem = candidate.name_stem.clone();
        }
        self.lock_cache()?.clear();

        let preview = self.render_or_report(&candidate)?;

        log::info!(
            "✅ 图片加载完成 - 名称: {} {} decode={}ms total={}ms",
            name,
            preview.status,
            decode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(preview)
    }

    /// 从任意来源加载（文件选择 / 拖放 / 粘贴都汇入这里）。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixel_upscaler::upscaler::{ImageSource, PreviewController, UpscaleConfig};
    ///
    /// # async fn demo() -> Result<(), pixel_upscaler::upscaler::UpscaleError> {
    /// let controller = PreviewController::new(UpscaleConfig::default())?;
    /// controller
    ///     .load_source(ImageSource::FilePath("sprite.png".into()))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_source(&self, source: ImageSource) -> Result<RenderedPreview, UpscaleError> {
        let config = self.config.clone();
        let raw = tokio::task::spawn_blocking(move || loader::load_source(source, &config))
            .await
            .map_err(|e| UpscaleError::FileSystem(format!("加载任务异常终止：{}", e)))??;

        log::debug!("📥 已加载原始字节 - 来源: {} 体积: {}KB", raw.source_hint, raw.bytes.len() / 1024);

        self.load_image(raw.bytes, &raw.name).await
    }

    /// 设置倍率：向下取整，最小为 1，然后重新渲染。
    pub fn set_scale_factor(&self, value: f64) -> Result<RenderedPreview, UpscaleError> {
        let factor = ScaleFactor::clamped(value);
        if value.is_nan() || factor.get() as f64 != value {
            log::warn!("⚠️ 倍率输入 {} 已规整为 {}", value, factor);
        }

        let mut candidate = self.session()?;
        candidate.factor = factor;
        let preview = self.render_session(&candidate)?;

        self.write_session()?.factor = factor;
        log::debug!("⚙️ 倍率已切换：x{}", factor);

        Ok(preview)
    }

    /// 快捷倍率按钮（2 / 3 / 4 / 5 / 10）。
    pub fn apply_preset(&self, preset: u32) -> Result<RenderedPreview, UpscaleError> {
        if !super::SCALE_PRESETS.contains(&preset) {
            return Err(UpscaleError::InvalidFactor(format!(
                "未知倍率预设：{}（可选：{:?}）",
                preset,
                super::SCALE_PRESETS
            )));
        }
        self.set_scale_factor(preset as f64)
    }

    /// 设置导出格式，返回质量输入框是否可用（PNG 下禁用）。
    pub fn set_format(&self, format: ExportFormat) -> Result<bool, UpscaleError> {
        self.write_session()?.format = format;
        log::debug!("⚙️ 导出格式已切换：{}", format.as_str());
        Ok(format.accepts_quality())
    }

    /// 设置有损质量，返回实际生效的值。
    pub fn set_quality(&self, value: f64) -> Result<QualityLevel, UpscaleError> {
        let quality = QualityLevel::clamped(value);
        self.write_session()?.quality = quality;
        log::debug!("⚙️ 导出质量已设置：{:.2}", quality.value());
        Ok(quality)
    }

    /// 按当前会话渲染预览。
    pub fn render(&self) -> Result<RenderedPreview, UpscaleError> {
        let snapshot = self.session()?;
        self.render_or_report(&snapshot)
    }

    /// 导出：放大 → 编码，返回字节与文件名 `{stem}_x{factor}.{ext}`。
    pub async fn export(&self) -> Result<ExportedImage, UpscaleError> {
        let snapshot = self.session()?;
        let source = snapshot.source.clone().ok_or(UpscaleError::NoImage)?;

        let total_start = Instant::now();
        let scaled = self.scaled_surface(&source, snapshot.generation, snapshot.factor)?;

        let format = snapshot.format;
        let quality = snapshot.quality;
        let bytes = tokio::task::spawn_blocking(move || encoder::encode(&scaled, format, Some(quality)))
            .await
            .map_err(|e| UpscaleError::Encode(format!("编码任务异常终止：{}", e)))??;

        let file_name = snapshot.export_file_name();
        log::info!(
            "📦 导出完成 - 文件: {} 体积: {}KB total={}ms",
            file_name,
            bytes.len() / 1024,
            total_start.elapsed().as_millis()
        );

        Ok(ExportedImage {
            bytes,
            file_name,
            format,
            mime_type: format.mime_type(),
        })
    }

    /// 导出并交给输出端，返回写出的文件名。
    pub async fn export_to(&self, sink: &dyn OutputSink) -> Result<String, UpscaleError> {
        let exported = self.export().await?;
        sink.deliver(&exported.bytes, &exported.file_name)?;
        Ok(exported.file_name)
    }

    /// 严格渲染：超出输出像素上限时返回错误。
    fn render_session(&self, session: &Session) -> Result<RenderedPreview, UpscaleError> {
        let status = session.status();
        let Some(source) = session.source.clone() else {
            return Ok(RenderedPreview {
                source: None,
                output: Arc::new(PixelSurface::empty()),
                status,
                output_error: None,
            });
        };

        let output = self.scaled_surface(&source, session.generation, session.factor)?;
        Ok(RenderedPreview {
            source: Some(source),
            output,
            status,
            output_error: None,
        })
    }

    /// 宽松渲染：超出输出像素上限时返回空输出并附带原因。
    fn render_or_report(&self, session: &Session) -> Result<RenderedPreview, UpscaleError> {
        if let Some(source) = &session.source {
            let (width, height) = source.dimensions();
            if let Err(limit) =
                resample::check_output_limit(width, height, session.factor, self.config.max_output_pixels)
            {
                log::warn!("⚠️ 当前倍率 x{} 无法生成预览：{}", session.factor, limit);
                return Ok(RenderedPreview {
                    source: Some(Arc::clone(source)),
                    output: Arc::new(PixelSurface::empty()),
                    status: session.status(),
                    output_error: Some(limit),
                });
            }
        }

        self.render_session(session)
    }

    /// 取缓存中的放大结果，未命中则计算并写回缓存。
    fn scaled_surface(
        &self,
        source: &Arc<PixelSurface>,
        generation: u64,
        factor: ScaleFactor,
    ) -> Result<Arc<PixelSurface>, UpscaleError> {
        let key = (generation, factor);
        if let Some(hit) = self.lock_cache()?.get(&key) {
            log::debug!("♻️ 命中放大缓存 - generation={} x{}", generation, factor);
            return Ok(Arc::clone(hit));
        }

        let scaled = Arc::new(resample::scale_with_limit(
            source,
            factor,
            self.config.max_output_pixels,
        )?);
        // 已被新加载取代的 generation 不再写入缓存
        if self.read_session()?.generation == generation {
            self.lock_cache()?.put(key, Arc::clone(&scaled));
        }
        Ok(scaled)
    }

    fn read_session(&self) -> Result<RwLockReadGuard<'_, Session>, UpscaleError> {
        self.session
            .read()
            .map_err(|_| UpscaleError::ResourceLimit("会话读取锁已中毒".to_string()))
    }

    fn write_session(&self) -> Result<RwLockWriteGuard<'_, Session>, UpscaleError> {
        self.session
            .write()
            .map_err(|_| UpscaleError::ResourceLimit("会话写入锁已中毒".to_string()))
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, LruCache<RenderKey, Arc<PixelSurface>>>, UpscaleError> {
        self.render_cache
            .lock()
            .map_err(|_| UpscaleError::ResourceLimit("放大缓存锁已中毒".to_string()))
    }
}

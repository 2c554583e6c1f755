use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::upscaler::UpscaleConfig;

/// 读取设置文件；文件不存在或内容无法解析时回退到默认配置。
pub fn load_settings_from_path(settings_path: &Path) -> UpscaleConfig {
    if !settings_path.exists() {
        return UpscaleConfig::default();
    }

    let parsed = fs::read_to_string(settings_path)
        .ok()
        .and_then(|content| serde_json::from_str::<UpscaleConfig>(&content).ok())
        .filter(|config| config.validate().is_ok());

    match parsed {
        Some(config) => config,
        None => {
            log::warn!("设置文件无效，使用默认配置: {}", settings_path.display());
            UpscaleConfig::default()
        }
    }
}

pub fn save_settings_to_path(settings_path: &Path, config: &UpscaleConfig) -> Result<(), AppError> {
    config.validate()?;

    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(settings_path, content)?;
    Ok(())
}

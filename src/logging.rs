//! 日志初始化。
//!
//! 库内只通过 `log` 门面输出；宿主（UI 绑定层 / 测试）调用一次 `init_logging` 即可看到输出。
//! 过滤规则可用 `RUST_LOG` 覆盖。

/// 初始化 `env_logger`，重复调用不会报错。
pub fn init_logging(default_filter: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();

    if result.is_ok() {
        log::info!("logging: initialized (default filter = {})", default_filter);
    }
}

pub mod api;
pub mod core;

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// 初始化 env_logger，重复调用安全
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    });
}

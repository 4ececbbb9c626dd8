//! 日志初始化

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化 tracing 订阅器（RUST_LOG 可覆盖，默认 info）
///
/// 重复调用是安全的，后续调用不生效。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

//! 引擎配置

use chrono::Duration;
use chrono_tz::Tz;

/// 通知与复查引擎的运行参数
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 升级存活窗口：超过后不再重发提醒
    pub escalation_window: Duration,
    /// 通知后多久触发延迟复查
    pub recheck_delay: Duration,
    /// 日历日对齐用的固定参考时区
    pub reference_tz: Tz,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escalation_window: Duration::minutes(60),
            recheck_delay: Duration::minutes(10),
            reference_tz: chrono_tz::America::New_York,
        }
    }
}

impl EngineConfig {
    /// 设置升级窗口
    pub fn with_escalation_window(mut self, window: Duration) -> Self {
        self.escalation_window = window;
        self
    }

    /// 设置复查延迟
    pub fn with_recheck_delay(mut self, delay: Duration) -> Self {
        self.recheck_delay = delay;
        self
    }

    /// 设置参考时区
    pub fn with_reference_tz(mut self, tz: Tz) -> Self {
        self.reference_tz = tz;
        self
    }
}

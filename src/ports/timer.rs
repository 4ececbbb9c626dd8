//! 延迟触发器接口
//!
//! 复查状态的唯一载体。契约：延迟不小于指定时长，至少一次投递；
//! 触发器丢失时标记推导会在下一个事件重新算出正确值，不会卡死。

use crate::event::EscalationState;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

/// 持久延迟调用
#[async_trait]
pub trait DelayScheduler: Send + Sync {
    async fn schedule(&self, state: EscalationState, delay: Duration) -> Result<()>;
}

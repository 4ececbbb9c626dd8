//! 升级调度 - 判断是否需要延迟复查并挂到持久定时器上
//!
//! 只要有一个匹配订阅具备升级资格就调度一次复查。调度是
//! fire-and-forget：失败记日志，不影响通知流程的结果。

use crate::event::{BehaviorEvent, EscalationState};
use crate::ports::DelayScheduler;
use crate::subscription::MatchedSubscription;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 升级调度器
pub struct EscalationScheduler {
    timer: Arc<dyn DelayScheduler>,
    delay: Duration,
}

impl EscalationScheduler {
    pub fn new(timer: Arc<dyn DelayScheduler>, delay: Duration) -> Self {
        Self { timer, delay }
    }

    /// 有升级资格的订阅时调度延迟复查
    ///
    /// 返回是否发起了调度（调度请求失败也算未发起）。
    pub async fn schedule_if_eligible(
        &self,
        matched: &[MatchedSubscription],
        event: &BehaviorEvent,
    ) -> bool {
        if !matched.iter().any(|m| m.escalation_eligible) {
            debug!(
                behavior_id = %event.behavior_id,
                "No escalation-eligible subscriptions, skipping recheck"
            );
            return false;
        }

        let state = EscalationState::from_event(event);
        match self.timer.schedule(state, self.delay).await {
            Ok(()) => {
                info!(
                    student_id = %event.student_id,
                    behavior_id = %event.behavior_id,
                    delay_minutes = self.delay.num_minutes(),
                    "Response recheck scheduled"
                );
                true
            }
            Err(e) => {
                // 调度失败不回滚通知，下一个事件会重新推导状态
                warn!(
                    student_id = %event.student_id,
                    behavior_id = %event.behavior_id,
                    error = %e,
                    "Failed to schedule response recheck"
                );
                false
            }
        }
    }
}

//! 存储类协作方接口

use crate::student::{BehaviorOccurrence, StudentProfile, TeamMember};
use crate::subscription::SubscriptionGroup;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 学生的通知订阅配置（引擎只读）
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn subscriptions(&self, student_id: &str) -> Result<Vec<SubscriptionGroup>>;
}

/// 学生档案目录
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn profile(&self, student_id: &str) -> Result<StudentProfile>;
}

/// 行为日报表
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// 查询 `[day_start, day_end)` 窗口内该学生的全部行为发生记录
    async fn day_report(
        &self,
        student_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<BehaviorOccurrence>>;
}

/// 学生团队名册（成员 + 行为访问权限）
#[async_trait]
pub trait TeamRoster: Send + Sync {
    async fn team(&self, student_id: &str) -> Result<Vec<TeamMember>>;
}

/// 每用户每学生的未回应提醒标记
#[async_trait]
pub trait AlertFlagStore: Send + Sync {
    async fn set_outstanding(&self, user_id: &str, student_id: &str, outstanding: bool)
        -> Result<()>;
}

/// 每用户的最近行为通知记录（App 内展示用）
#[async_trait]
pub trait NotificationLog: Send + Sync {
    async fn record(
        &self,
        user_id: &str,
        student_id: &str,
        behavior_id: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;
}

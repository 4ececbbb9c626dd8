//! 行为事件结构 - 上游追踪端产生的不可变事件记录
//!
//! 定义通知流程和延迟复查流程共用的事件数据结构。
//! 两个流程之间唯一的关联载体是 `EscalationState`，由延迟触发器原样传递。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 事件来源设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// 手机 App
    App,
    /// 旧式实体追踪设备
    LegacyDevice,
    /// Web 端用户
    Web,
}

/// 事件来源（设备类型 + 记录者）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    /// 设备类型
    pub device: DeviceKind,
    /// 记录者 ID（设备 ID 或用户 ID，取决于设备类型）
    pub rater_id: String,
}

/// 行为事件
///
/// 奇偶字段表示该行为当天/当周的第 N 次发生，N mod 2 决定
/// duration 行为的本次是开始还是结束。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    /// 学生 ID
    pub student_id: String,
    /// 行为 ID
    pub behavior_id: String,
    /// 事件时间
    pub event_time: DateTime<Utc>,
    /// 事件来源
    pub source: EventSource,
    /// 当天发生次数奇偶（0 或 1）
    pub day_parity: u8,
    /// 当周发生次数奇偶（0 或 1）
    pub week_parity: u8,
    /// 是否为 duration（开始/结束成对）行为
    pub is_duration: bool,
}

impl BehaviorEvent {
    /// 创建新事件
    pub fn new(
        student_id: impl Into<String>,
        behavior_id: impl Into<String>,
        event_time: DateTime<Utc>,
        source: EventSource,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            behavior_id: behavior_id.into(),
            event_time,
            source,
            day_parity: 0,
            week_parity: 0,
            is_duration: false,
        }
    }

    /// 设置奇偶字段（链式调用）
    pub fn with_parity(mut self, day_parity: u8, week_parity: u8) -> Self {
        self.day_parity = day_parity;
        self.week_parity = week_parity;
        self
    }

    /// 标记为 duration 行为（链式调用）
    pub fn with_duration(mut self, is_duration: bool) -> Self {
        self.is_duration = is_duration;
        self
    }
}

/// 升级复查状态
///
/// 通知流程判定需要延迟复查时构造，交给延迟触发器；
/// 复查流程消费一次后即丢弃，不做持久化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationState {
    /// 学生 ID
    pub student_id: String,
    /// 触发行为 ID
    pub behavior_id: String,
    /// 触发事件时间
    pub event_time: DateTime<Utc>,
    /// 是否为 duration 行为
    pub is_duration: bool,
    /// 事件来源
    pub source: EventSource,
    /// 当天奇偶
    pub day_parity: u8,
    /// 当周奇偶
    pub week_parity: u8,
    /// 跳过超时判定（强制复查）
    #[serde(default)]
    pub skip_timeout: bool,
}

impl EscalationState {
    /// 从触发事件构造复查状态
    pub fn from_event(event: &BehaviorEvent) -> Self {
        Self {
            student_id: event.student_id.clone(),
            behavior_id: event.behavior_id.clone(),
            event_time: event.event_time,
            is_duration: event.is_duration,
            source: event.source.clone(),
            day_parity: event.day_parity,
            week_parity: event.week_parity,
            skip_timeout: false,
        }
    }

    /// 还原触发事件（复查流程重新进入通知流程时使用）
    pub fn to_event(&self) -> BehaviorEvent {
        BehaviorEvent {
            student_id: self.student_id.clone(),
            behavior_id: self.behavior_id.clone(),
            event_time: self.event_time,
            source: self.source.clone(),
            day_parity: self.day_parity,
            week_parity: self.week_parity,
            is_duration: self.is_duration,
        }
    }

    /// 跳过超时判定（链式调用）
    pub fn with_skip_timeout(mut self, skip: bool) -> Self {
        self.skip_timeout = skip;
        self
    }
}

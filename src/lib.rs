//! Behavior Notify - 行为通知与回应升级引擎
//!
//! 追踪到行为事件后，按订阅配置把提醒扇出到推送/邮件/短信/App 内
//! 四类渠道；要求回应的订阅再经延迟复查判定回应是否到达，
//! 未到达且仍在存活窗口内则重发提醒，并维护每用户的未回应标记。
//!
//! # 设计目标
//! 1. 两个无状态入口：`NotifyEngine::notify` 与 `ResolutionEngine::resolve`
//! 2. 渠道解耦：四类渠道并发扇出，单渠道失败互不影响
//! 3. 自愈：复查结论全部从当前存储重新推导，定时器丢失或重复投递都无害
//! 4. 协作方全部走 trait 注入，测试用内存实现替换

pub mod builder;
pub mod composer;
pub mod config;
pub mod dispatch;
pub mod duration;
pub mod engine;
pub mod event;
pub mod gateway;
pub mod ports;
pub mod resolution;
pub mod scheduler;
pub mod student;
pub mod subscription;
pub mod telemetry;

pub use builder::EngineBuilder;
pub use composer::{render_template, ComposedMessage, MessageComposer};
pub use config::EngineConfig;
pub use dispatch::{ChannelDispatcher, ChannelOutcome, DispatchReport};
pub use duration::duration_started;
pub use engine::{Notifier, NotifyEngine, NotifyOptions, NotifyOutcome, SubscriptionDispatch};
pub use event::{BehaviorEvent, DeviceKind, EscalationState, EventSource};
pub use gateway::{GatewayClient, GatewayConfig};
pub use ports::{
    AlertFlagStore, DelayScheduler, EmailGateway, NotificationLog, PushEndpoint, PushGateway,
    PushPlatform, ReportStore, SmsGateway, SourceNameResolver, SourceResolverSet,
    StudentDirectory, SubscriptionStore, TeamRoster, TemplateStore,
};
pub use resolution::{
    FlagUpdate, ResolutionEngine, ResolutionOutcome, SubscriptionResolution,
};
pub use scheduler::EscalationScheduler;
pub use student::{
    BehaviorAccess, BehaviorDefinition, BehaviorOccurrence, StudentProfile, TeamMember,
};
pub use subscription::{
    match_subscriptions, MatchedSubscription, MessageTemplates, SubscriptionGroup,
};

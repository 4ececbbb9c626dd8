//! 通知流程编排
//!
//! 一次调用处理一个行为事件：匹配订阅、渲染消息、四渠道并发
//! 分发、必要时调度延迟复查。调用之间不共享可变状态。

use crate::composer::MessageComposer;
use crate::dispatch::{ChannelDispatcher, DispatchContext, DispatchReport};
use crate::duration::duration_started;
use crate::event::BehaviorEvent;
use crate::ports::{StudentDirectory, SubscriptionStore};
use crate::scheduler::EscalationScheduler;
use crate::student::StudentProfile;
use crate::subscription::{match_subscriptions, SubscriptionGroup};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

/// 通知选项
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyOptions {
    /// 跳过 App 内通知记录（复查流程的重发置位）
    pub skip_behavior_log: bool,
}

/// 单个订阅组的分发结果
#[derive(Debug, Clone)]
pub struct SubscriptionDispatch {
    pub subscription_id: Uuid,
    pub subscription_name: String,
    pub report: DispatchReport,
}

/// 一轮通知的汇总结果
#[derive(Debug, Clone)]
pub struct NotifyOutcome {
    /// 匹配到的订阅数
    pub matched: usize,
    /// 是否调度了延迟复查
    pub recheck_scheduled: bool,
    /// 各订阅的渠道结果
    pub dispatches: Vec<SubscriptionDispatch>,
}

impl NotifyOutcome {
    fn empty() -> Self {
        Self {
            matched: 0,
            recheck_scheduled: false,
            dispatches: Vec::new(),
        }
    }
}

/// 重新进入通知流程的能力
///
/// 复查引擎通过构造注入拿到它，按订阅重发提醒。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_subscription(
        &self,
        event: &BehaviorEvent,
        subscription: &SubscriptionGroup,
        opts: NotifyOptions,
    ) -> Result<DispatchReport>;
}

/// 通知引擎
pub struct NotifyEngine {
    subscriptions: Arc<dyn SubscriptionStore>,
    students: Arc<dyn StudentDirectory>,
    composer: MessageComposer,
    dispatcher: ChannelDispatcher,
    scheduler: EscalationScheduler,
}

impl NotifyEngine {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        students: Arc<dyn StudentDirectory>,
        composer: MessageComposer,
        dispatcher: ChannelDispatcher,
        scheduler: EscalationScheduler,
    ) -> Self {
        Self {
            subscriptions,
            students,
            composer,
            dispatcher,
            scheduler,
        }
    }

    /// 入口：对一个行为事件执行完整的通知流程
    pub async fn notify(&self, event: &BehaviorEvent) -> Result<NotifyOutcome> {
        let (subscriptions, student) = tokio::try_join!(
            self.subscriptions.subscriptions(&event.student_id),
            self.students.profile(&event.student_id),
        )?;

        let matched = match_subscriptions(event, &subscriptions);
        if matched.is_empty() {
            info!(
                student_id = %event.student_id,
                behavior_id = %event.behavior_id,
                "No subscriptions matched"
            );
            return Ok(NotifyOutcome::empty());
        }

        // 来源名称查询在整轮通知内共享，至多解析一次
        let who_cache = OnceCell::new();
        let opts = NotifyOptions::default();

        let dispatches = join_all(matched.iter().map(|m| {
            let who_cache = &who_cache;
            let student = &student;
            async move {
                let report = self
                    .dispatch_one(event, &m.group, student, opts, who_cache)
                    .await;
                SubscriptionDispatch {
                    subscription_id: m.group.id,
                    subscription_name: m.group.name.clone(),
                    report,
                }
            }
        }))
        .await;

        let recheck_scheduled = self.scheduler.schedule_if_eligible(&matched, event).await;

        info!(
            student_id = %event.student_id,
            behavior_id = %event.behavior_id,
            matched = matched.len(),
            recheck_scheduled,
            "Notify pass complete"
        );

        Ok(NotifyOutcome {
            matched: matched.len(),
            recheck_scheduled,
            dispatches,
        })
    }

    /// 渲染并分发单个订阅组
    async fn dispatch_one(
        &self,
        event: &BehaviorEvent,
        group: &SubscriptionGroup,
        student: &StudentProfile,
        opts: NotifyOptions,
        who_cache: &OnceCell<String>,
    ) -> DispatchReport {
        let definition = student.definition(&event.behavior_id);
        let behavior_name = definition
            .map(|d| d.name.clone())
            .unwrap_or_else(|| event.behavior_id.clone());
        let started = duration_started(definition, event);
        let is_response = student.is_response(&event.behavior_id);

        let message = self
            .composer
            .compose(
                &group.templates,
                student,
                &behavior_name,
                &event.source,
                who_cache,
            )
            .await;

        let ctx = DispatchContext {
            event,
            student,
            behavior_name: &behavior_name,
            started,
            is_response,
            skip_behavior_log: opts.skip_behavior_log,
        };
        self.dispatcher.dispatch(group, &message, &ctx).await
    }
}

#[async_trait]
impl Notifier for NotifyEngine {
    async fn notify_subscription(
        &self,
        event: &BehaviorEvent,
        subscription: &SubscriptionGroup,
        opts: NotifyOptions,
    ) -> Result<DispatchReport> {
        let student = self.students.profile(&event.student_id).await?;
        let who_cache = OnceCell::new();
        Ok(self
            .dispatch_one(event, subscription, &student, opts, &who_cache)
            .await)
    }
}

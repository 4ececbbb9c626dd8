//! 渠道分发 - 把渲染好的消息扇出到四类收件渠道
//!
//! # 设计目标
//! 1. 四个渠道并发执行，单渠道失败不影响其他渠道
//! 2. 推送/短信尽力而为：失败记日志，不向调用方抛错
//! 3. 邮件失败必须在结果里可见（模板拉取失败同样算失败）
//! 4. 每类收件人列表先去重再扇出

pub mod email;
pub mod in_app;
pub mod push;
pub mod sms;

use crate::composer::ComposedMessage;
use crate::event::BehaviorEvent;
use crate::ports::{EmailGateway, NotificationLog, PushGateway, SmsGateway, TemplateStore};
use crate::student::StudentProfile;
use crate::subscription::SubscriptionGroup;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 单渠道的发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelOutcome {
    /// 已发送
    Sent,
    /// 跳过（无收件人、无模板等）
    Skipped(String),
    /// 失败
    Failed(String),
}

impl ChannelOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ChannelOutcome::Failed(_))
    }
}

/// 一个订阅组的四渠道发送结果
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub push: ChannelOutcome,
    pub email: ChannelOutcome,
    pub sms: ChannelOutcome,
    pub in_app: ChannelOutcome,
}

/// 一次分发的事件上下文
pub struct DispatchContext<'a> {
    pub event: &'a BehaviorEvent,
    pub student: &'a StudentProfile,
    /// 行为展示名
    pub behavior_name: &'a str,
    /// duration 行为的开始/结束状态（仅影响文案）
    pub started: Option<bool>,
    /// 事件本身是否为回应类行为
    pub is_response: bool,
    /// 跳过 App 内通知记录（复查流程的重发）
    pub skip_behavior_log: bool,
}

/// 去重，保持首次出现的顺序
pub(crate) fn dedup(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|i| !i.trim().is_empty() && seen.insert(i.as_str()))
        .cloned()
        .collect()
}

/// 渠道分发器
pub struct ChannelDispatcher {
    push: Arc<dyn PushGateway>,
    email: Arc<dyn EmailGateway>,
    sms: Arc<dyn SmsGateway>,
    templates: Arc<dyn TemplateStore>,
    log: Arc<dyn NotificationLog>,
}

impl ChannelDispatcher {
    pub fn new(
        push: Arc<dyn PushGateway>,
        email: Arc<dyn EmailGateway>,
        sms: Arc<dyn SmsGateway>,
        templates: Arc<dyn TemplateStore>,
        log: Arc<dyn NotificationLog>,
    ) -> Self {
        Self {
            push,
            email,
            sms,
            templates,
            log,
        }
    }

    /// 把消息发给订阅组的所有收件渠道
    ///
    /// 四个渠道并发执行，互不阻塞；返回各渠道结果。
    pub async fn dispatch(
        &self,
        subscription: &SubscriptionGroup,
        message: &ComposedMessage,
        ctx: &DispatchContext<'_>,
    ) -> DispatchReport {
        let (push, email, sms, in_app) = tokio::join!(
            push::deliver(self.push.as_ref(), &subscription.device_ids, message, ctx),
            email::deliver(
                self.email.as_ref(),
                self.templates.as_ref(),
                &subscription.emails,
                message,
                ctx,
            ),
            sms::deliver(self.sms.as_ref(), &subscription.mobiles, message, ctx),
            in_app::deliver(self.log.as_ref(), &subscription.user_ids, ctx),
        );

        debug!(
            subscription = %subscription.name,
            push = ?push,
            email = ?email,
            sms = ?sms,
            in_app = ?in_app,
            "Dispatch complete"
        );

        DispatchReport {
            push,
            email,
            sms,
            in_app,
        }
    }
}

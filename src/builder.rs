//! 引擎构建器 - 把协作方接口装配成两个引擎
//!
//! 通知引擎同时实现重发能力并注入复查引擎，
//! 不存在可替换的全局钩子。

use crate::composer::MessageComposer;
use crate::config::EngineConfig;
use crate::dispatch::ChannelDispatcher;
use crate::engine::NotifyEngine;
use crate::ports::{
    AlertFlagStore, DelayScheduler, EmailGateway, NotificationLog, PushGateway, ReportStore,
    SmsGateway, SourceResolverSet, StudentDirectory, SubscriptionStore, TeamRoster, TemplateStore,
};
use crate::resolution::ResolutionEngine;
use crate::scheduler::EscalationScheduler;
use anyhow::{anyhow, Result};
use std::sync::Arc;

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("{name} is required"))
}

/// 引擎构建器
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    subscriptions: Option<Arc<dyn SubscriptionStore>>,
    students: Option<Arc<dyn StudentDirectory>>,
    reports: Option<Arc<dyn ReportStore>>,
    team: Option<Arc<dyn TeamRoster>>,
    flags: Option<Arc<dyn AlertFlagStore>>,
    notification_log: Option<Arc<dyn NotificationLog>>,
    push: Option<Arc<dyn PushGateway>>,
    email: Option<Arc<dyn EmailGateway>>,
    sms: Option<Arc<dyn SmsGateway>>,
    templates: Option<Arc<dyn TemplateStore>>,
    timer: Option<Arc<dyn DelayScheduler>>,
    resolvers: Option<SourceResolverSet>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn subscriptions(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.subscriptions = Some(store);
        self
    }

    pub fn students(mut self, directory: Arc<dyn StudentDirectory>) -> Self {
        self.students = Some(directory);
        self
    }

    pub fn reports(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.reports = Some(store);
        self
    }

    pub fn team(mut self, roster: Arc<dyn TeamRoster>) -> Self {
        self.team = Some(roster);
        self
    }

    pub fn alert_flags(mut self, store: Arc<dyn AlertFlagStore>) -> Self {
        self.flags = Some(store);
        self
    }

    pub fn notification_log(mut self, log: Arc<dyn NotificationLog>) -> Self {
        self.notification_log = Some(log);
        self
    }

    pub fn push(mut self, gateway: Arc<dyn PushGateway>) -> Self {
        self.push = Some(gateway);
        self
    }

    pub fn email(mut self, gateway: Arc<dyn EmailGateway>) -> Self {
        self.email = Some(gateway);
        self
    }

    pub fn sms(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.sms = Some(gateway);
        self
    }

    pub fn templates(mut self, store: Arc<dyn TemplateStore>) -> Self {
        self.templates = Some(store);
        self
    }

    pub fn timer(mut self, scheduler: Arc<dyn DelayScheduler>) -> Self {
        self.timer = Some(scheduler);
        self
    }

    pub fn source_resolvers(mut self, resolvers: SourceResolverSet) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    /// 装配通知引擎与复查引擎
    pub fn build(self) -> Result<(Arc<NotifyEngine>, ResolutionEngine)> {
        let subscriptions = require(self.subscriptions, "subscription store")?;
        let students = require(self.students, "student directory")?;
        let reports = require(self.reports, "report store")?;
        let team = require(self.team, "team roster")?;
        let flags = require(self.flags, "alert flag store")?;

        let composer = MessageComposer::new(require(self.resolvers, "source resolvers")?);
        let dispatcher = ChannelDispatcher::new(
            require(self.push, "push gateway")?,
            require(self.email, "email gateway")?,
            require(self.sms, "sms gateway")?,
            require(self.templates, "template store")?,
            require(self.notification_log, "notification log")?,
        );
        let scheduler = EscalationScheduler::new(
            require(self.timer, "delay scheduler")?,
            self.config.recheck_delay,
        );

        let notify = Arc::new(NotifyEngine::new(
            subscriptions.clone(),
            students,
            composer,
            dispatcher,
            scheduler,
        ));
        let resolution = ResolutionEngine::new(
            subscriptions,
            reports,
            team,
            flags,
            notify.clone(),
            self.config,
        );
        Ok((notify, resolution))
    }
}

//! 集成测试共用的内存协作方实现
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use behavior_notify::{
    AlertFlagStore, BehaviorDefinition, BehaviorOccurrence, DelayScheduler, EmailGateway,
    EngineBuilder, EngineConfig, EscalationState, MessageTemplates, NotificationLog, NotifyEngine,
    PushEndpoint, PushGateway, ReportStore, ResolutionEngine, SmsGateway, SourceNameResolver,
    SourceResolverSet, StudentDirectory, StudentProfile, SubscriptionGroup, SubscriptionStore,
    TeamMember, TeamRoster, TemplateStore,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct MemorySubscriptions(pub Vec<SubscriptionGroup>);

#[async_trait]
impl SubscriptionStore for MemorySubscriptions {
    async fn subscriptions(&self, _student_id: &str) -> Result<Vec<SubscriptionGroup>> {
        Ok(self.0.clone())
    }
}

pub struct MemoryStudents(pub StudentProfile);

#[async_trait]
impl StudentDirectory for MemoryStudents {
    async fn profile(&self, _student_id: &str) -> Result<StudentProfile> {
        Ok(self.0.clone())
    }
}

pub struct MemoryReport(pub Vec<BehaviorOccurrence>);

#[async_trait]
impl ReportStore for MemoryReport {
    async fn day_report(
        &self,
        _student_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<BehaviorOccurrence>> {
        Ok(self
            .0
            .iter()
            .filter(|o| o.event_time >= day_start && o.event_time < day_end)
            .cloned()
            .collect())
    }
}

pub struct MemoryTeam(pub Vec<TeamMember>);

#[async_trait]
impl TeamRoster for MemoryTeam {
    async fn team(&self, _student_id: &str) -> Result<Vec<TeamMember>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingFlags {
    pub writes: Mutex<Vec<(String, String, bool)>>,
}

#[async_trait]
impl AlertFlagStore for RecordingFlags {
    async fn set_outstanding(
        &self,
        user_id: &str,
        student_id: &str,
        outstanding: bool,
    ) -> Result<()> {
        self.writes.lock().unwrap().push((
            user_id.to_string(),
            student_id.to_string(),
            outstanding,
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub records: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl NotificationLog for RecordingLog {
    async fn record(
        &self,
        user_id: &str,
        _student_id: &str,
        behavior_id: &str,
        _at: DateTime<Utc>,
    ) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .push((user_id.to_string(), behavior_id.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockPush {
    pub endpoints: HashMap<String, PushEndpoint>,
    pub sent: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl PushGateway for MockPush {
    async fn lookup_endpoint(&self, device_id: &str) -> Result<Option<PushEndpoint>> {
        Ok(self.endpoints.get(device_id).cloned())
    }

    async fn send_push(&self, endpoint_ref: &str, payload: serde_json::Value) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint_ref.to_string(), payload));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEmail {
    pub sent: Mutex<Vec<(Vec<String>, String, String)>>,
}

#[async_trait]
impl EmailGateway for RecordingEmail {
    async fn send_email(
        &self,
        addresses: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<()> {
        self.sent.lock().unwrap().push((
            addresses.to_vec(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(Vec<String>, String)>>,
}

#[async_trait]
impl SmsGateway for RecordingSms {
    async fn send_sms(&self, numbers: &[String], body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((numbers.to_vec(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTemplates(pub HashMap<String, String>);

#[async_trait]
impl TemplateStore for MemoryTemplates {
    async fn fetch(&self, path: &str) -> Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("template not found: {path}"))
    }
}

#[derive(Default)]
pub struct RecordingTimer {
    pub scheduled: Mutex<Vec<EscalationState>>,
}

#[async_trait]
impl DelayScheduler for RecordingTimer {
    async fn schedule(&self, state: EscalationState, _delay: Duration) -> Result<()> {
        self.scheduled.lock().unwrap().push(state);
        Ok(())
    }
}

pub struct FixedName(pub &'static str);

#[async_trait]
impl SourceNameResolver for FixedName {
    async fn display_name(&self, _rater_id: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// 默认学生：行为 234 (Wandering)，回应 456 (Checked in)
pub fn student() -> StudentProfile {
    StudentProfile {
        id: "student-1".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        nickname: None,
        behaviors: vec![BehaviorDefinition {
            id: "234".to_string(),
            name: "Wandering".to_string(),
            is_duration: false,
            daytime: true,
        }],
        responses: vec![BehaviorDefinition {
            id: "456".to_string(),
            name: "Checked in".to_string(),
            is_duration: false,
            daytime: false,
        }],
    }
}

/// 订阅组构造基底
pub fn subscription(behaviors: &[&str], responses: &[&str]) -> SubscriptionGroup {
    SubscriptionGroup {
        id: Uuid::new_v4(),
        name: "Wandering watch".to_string(),
        behavior_ids: behaviors.iter().map(|s| s.to_string()).collect(),
        response_ids: responses.iter().map(|s| s.to_string()).collect(),
        notify_until_response: !responses.is_empty(),
        emails: Vec::new(),
        mobiles: Vec::new(),
        user_ids: vec!["u1".to_string()],
        device_ids: Vec::new(),
        templates: MessageTemplates {
            default: Some("{Behavior} for {FirstName}".to_string()),
            ..Default::default()
        },
    }
}

pub fn occurrence(behavior: &str, time: DateTime<Utc>) -> BehaviorOccurrence {
    BehaviorOccurrence {
        behavior_id: behavior.to_string(),
        event_time: time,
        deleted: false,
    }
}

/// 装配好的测试引擎与各记录器句柄
pub struct Harness {
    pub notify: Arc<NotifyEngine>,
    pub resolution: ResolutionEngine,
    pub flags: Arc<RecordingFlags>,
    pub log: Arc<RecordingLog>,
    pub push: Arc<MockPush>,
    pub email: Arc<RecordingEmail>,
    pub sms: Arc<RecordingSms>,
    pub timer: Arc<RecordingTimer>,
}

pub struct HarnessBuilder {
    pub subscriptions: Vec<SubscriptionGroup>,
    pub student: StudentProfile,
    pub report: Vec<BehaviorOccurrence>,
    pub team: Vec<TeamMember>,
    pub endpoints: HashMap<String, PushEndpoint>,
    pub templates: HashMap<String, String>,
    pub config: EngineConfig,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            student: student(),
            report: Vec::new(),
            team: vec![TeamMember {
                user_id: "u1".to_string(),
                access: behavior_notify::BehaviorAccess::Unrestricted,
            }],
            endpoints: HashMap::new(),
            templates: HashMap::new(),
            config: EngineConfig::default(),
        }
    }
}

impl HarnessBuilder {
    pub fn build(self) -> Harness {
        let flags = Arc::new(RecordingFlags::default());
        let log = Arc::new(RecordingLog::default());
        let push = Arc::new(MockPush {
            endpoints: self.endpoints,
            sent: Mutex::new(Vec::new()),
        });
        let email = Arc::new(RecordingEmail::default());
        let sms = Arc::new(RecordingSms::default());
        let timer = Arc::new(RecordingTimer::default());

        let resolvers = SourceResolverSet::new(
            Arc::new(FixedName("Mom's iPhone")),
            Arc::new(FixedName("Classroom clicker")),
            Arc::new(FixedName("Ms. Rivera")),
        );

        let (notify, resolution) = EngineBuilder::new()
            .config(self.config)
            .subscriptions(Arc::new(MemorySubscriptions(self.subscriptions)))
            .students(Arc::new(MemoryStudents(self.student)))
            .reports(Arc::new(MemoryReport(self.report)))
            .team(Arc::new(MemoryTeam(self.team)))
            .alert_flags(flags.clone())
            .notification_log(log.clone())
            .push(push.clone())
            .email(email.clone())
            .sms(sms.clone())
            .templates(Arc::new(MemoryTemplates(self.templates)))
            .timer(timer.clone())
            .source_resolvers(resolvers)
            .build()
            .expect("all collaborators provided");

        Harness {
            notify,
            resolution,
            flags,
            log,
            push,
            email,
            sms,
            timer,
        }
    }
}

/// HashSet 字面量辅助
pub fn ids(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

//! 延迟复查流程 - 判定回应是否到达，更新标记并按需重发
//!
//! 每次调用是无状态的完整状态机：
//! 1. 加载：参考时区当天的报表 + 订阅列表
//! 2. 分类：每个匹配订阅找触发之后最早的回应事件
//! 3. 超时判定：距触发是否已超过存活窗口
//! 4. 覆盖规则（按顺序，先命中先生效）：触发已删除；duration
//!    当天发生次数为偶数（时段已闭合）；否则看回应与超时
//! 5. 对仍需回应的订阅重发提醒（不再记 App 内通知）
//! 6. 过滤团队成员与行为权限后落每用户的未回应标记
//!
//! 所有结论都从当前存储重新推导，重复调用得到相同结果；
//! 触发器丢失或重复投递都不会破坏标记的最终正确性。

use crate::config::EngineConfig;
use crate::dispatch::dedup;
use crate::engine::{Notifier, NotifyOptions};
use crate::event::EscalationState;
use crate::ports::{AlertFlagStore, ReportStore, SubscriptionStore, TeamRoster};
use crate::student::BehaviorOccurrence;
use crate::subscription::match_subscriptions;
use anyhow::Result;
use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 单个订阅的复查结论
#[derive(Debug, Clone)]
pub struct SubscriptionResolution {
    pub subscription_id: Uuid,
    pub subscription_name: String,
    /// 是否已有合格回应（或被覆盖规则判定为已了结）
    pub resolved: bool,
    /// 是否仍需提醒（未回应且仍在存活窗口内）
    pub needs_response: bool,
    /// 触发之后最早的回应事件
    pub response_event: Option<BehaviorOccurrence>,
}

/// 实际落库的标记更新
#[derive(Debug, Clone)]
pub struct FlagUpdate {
    pub user_id: String,
    pub outstanding: bool,
}

/// 一次复查的完整结果
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    /// 原样返回的复查状态
    pub state: EscalationState,
    /// 所有匹配订阅是否都已了结
    pub has_response: bool,
    /// 是否已超过存活窗口
    pub has_timeout: bool,
    /// 各订阅结论
    pub subscriptions: Vec<SubscriptionResolution>,
    /// 落库成功的标记更新
    pub flag_updates: Vec<FlagUpdate>,
}

/// 参考时区某日的零点，换算回 UTC
fn zoned_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&date.and_time(NaiveTime::MIN)) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // 夏令时跳变吞掉零点时退回 UTC 零点
        LocalResult::None => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
    }
}

/// 事件所在参考时区日历日的 `[起, 止)` 窗口
pub(crate) fn day_window(at: DateTime<Utc>, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = at.with_timezone(tz).date_naive();
    let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    (zoned_midnight(date, tz), zoned_midnight(next, tz))
}

/// 触发之后（严格晚于）最早的未删除回应事件
fn earliest_response(
    report: &[BehaviorOccurrence],
    response_ids: &HashSet<String>,
    after: DateTime<Utc>,
) -> Option<BehaviorOccurrence> {
    report
        .iter()
        .filter(|o| !o.deleted && o.event_time > after && response_ids.contains(&o.behavior_id))
        .min_by_key(|o| o.event_time)
        .cloned()
}

/// 复查引擎
pub struct ResolutionEngine {
    subscriptions: Arc<dyn SubscriptionStore>,
    reports: Arc<dyn ReportStore>,
    team: Arc<dyn TeamRoster>,
    flags: Arc<dyn AlertFlagStore>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl ResolutionEngine {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        reports: Arc<dyn ReportStore>,
        team: Arc<dyn TeamRoster>,
        flags: Arc<dyn AlertFlagStore>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            subscriptions,
            reports,
            team,
            flags,
            notifier,
            config,
        }
    }

    /// 入口：对延迟触发器投递的状态执行一次复查
    pub async fn resolve(&self, state: EscalationState) -> Result<ResolutionOutcome> {
        self.resolve_at(state, Utc::now()).await
    }

    /// 带显式时钟的复查（测试用）
    pub async fn resolve_at(
        &self,
        state: EscalationState,
        now: DateTime<Utc>,
    ) -> Result<ResolutionOutcome> {
        let (day_start, day_end) = day_window(state.event_time, &self.config.reference_tz);
        let (subscriptions, report) = tokio::try_join!(
            self.subscriptions.subscriptions(&state.student_id),
            self.reports.day_report(&state.student_id, day_start, day_end),
        )?;
        debug!(report_rows = report.len(), "Recheck loaded");

        let event = state.to_event();
        let matched = match_subscriptions(&event, &subscriptions);

        let trigger_present = report.iter().any(|o| {
            o.behavior_id == state.behavior_id && o.event_time == state.event_time && !o.deleted
        });
        let same_day_count = report
            .iter()
            .filter(|o| o.behavior_id == state.behavior_id && !o.deleted)
            .count();
        let duration_closed = state.is_duration && same_day_count % 2 == 0;

        let has_timeout = !state.skip_timeout
            && now.signed_duration_since(state.event_time) >= self.config.escalation_window;

        let resolutions: Vec<SubscriptionResolution> = matched
            .iter()
            .map(|m| {
                let response_event =
                    earliest_response(&report, &m.group.response_ids, state.event_time);
                let (resolved, needs_response) = if !trigger_present {
                    // 触发已删除：当作已了结
                    (true, false)
                } else if duration_closed {
                    // 时段已闭合：不需要回应
                    (true, false)
                } else {
                    let resolved = response_event.is_some();
                    (resolved, !resolved && !has_timeout)
                };
                SubscriptionResolution {
                    subscription_id: m.group.id,
                    subscription_name: m.group.name.clone(),
                    resolved,
                    needs_response,
                    response_event,
                }
            })
            .collect();

        let has_response = resolutions.iter().all(|r| r.resolved);

        // 仍需回应的订阅重发提醒，单订阅失败不影响其他订阅
        let renotifies = matched
            .iter()
            .zip(resolutions.iter())
            .filter(|(_, r)| r.needs_response)
            .map(|(m, _)| {
                let event = &event;
                async move {
                    if let Err(e) = self
                        .notifier
                        .notify_subscription(
                            event,
                            &m.group,
                            NotifyOptions {
                                skip_behavior_log: true,
                            },
                        )
                        .await
                    {
                        warn!(subscription = %m.group.name, error = %e, "Re-notify failed");
                    }
                }
            });
        join_all(renotifies).await;

        // 每用户标记：出现在任一未了结订阅上即为 true
        let mut needs_alert: BTreeMap<String, bool> = BTreeMap::new();
        for (m, r) in matched.iter().zip(resolutions.iter()) {
            for user_id in dedup(&m.group.user_ids) {
                let entry = needs_alert.entry(user_id).or_insert(false);
                *entry = *entry || !r.resolved;
            }
        }

        let mut flag_updates = Vec::new();
        if !needs_alert.is_empty() {
            let team = self.team.team(&state.student_id).await?;
            let writes: Vec<_> = needs_alert
                .iter()
                .filter_map(|(user_id, &outstanding)| {
                    if user_id.contains('@') {
                        debug!(user_id = %user_id, "Email-style identifier, no per-user flag");
                        return None;
                    }
                    let Some(member) = team.iter().find(|t| t.user_id == *user_id) else {
                        debug!(user_id = %user_id, "Not on the student's team, skipping flag");
                        return None;
                    };
                    if !member.access.allows(&state.behavior_id) {
                        debug!(user_id = %user_id, "Behavior outside user's access, skipping flag");
                        return None;
                    }
                    let student_id = state.student_id.clone();
                    Some(async move {
                        match self
                            .flags
                            .set_outstanding(user_id, &student_id, outstanding)
                            .await
                        {
                            Ok(()) => Some(FlagUpdate {
                                user_id: user_id.clone(),
                                outstanding,
                            }),
                            Err(e) => {
                                // 单用户失败不中断其余用户
                                warn!(user_id = %user_id, error = %e, "Alert flag update failed");
                                None
                            }
                        }
                    })
                })
                .collect();
            flag_updates = join_all(writes).await.into_iter().flatten().collect();
        }

        info!(
            student_id = %state.student_id,
            behavior_id = %state.behavior_id,
            matched = matched.len(),
            has_response,
            has_timeout,
            flags_written = flag_updates.len(),
            "Recheck complete"
        );

        Ok(ResolutionOutcome {
            state,
            has_response,
            has_timeout,
            subscriptions: resolutions,
            flag_updates,
        })
    }
}

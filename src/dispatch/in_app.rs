//! App 内通知记录
//!
//! 给订阅组里的每个用户写一条"最近行为通知"记录。duration 行为
//! 的结束事件不记录，已闭合的时段再记一条只会制造噪音；复查
//! 流程的重发也不记录。单用户写入失败不影响其余用户。

use super::{dedup, ChannelOutcome, DispatchContext};
use crate::ports::NotificationLog;
use futures::future::join_all;
use tracing::warn;

pub(crate) async fn deliver(
    log: &dyn NotificationLog,
    user_ids: &[String],
    ctx: &DispatchContext<'_>,
) -> ChannelOutcome {
    if ctx.skip_behavior_log {
        return ChannelOutcome::Skipped("bookkeeping suppressed".to_string());
    }
    if ctx.started == Some(false) {
        return ChannelOutcome::Skipped("duration already closed".to_string());
    }

    let users = dedup(user_ids);
    if users.is_empty() {
        return ChannelOutcome::Skipped("no users".to_string());
    }

    let writes = users.iter().map(|user_id| async move {
        if let Err(e) = log
            .record(
                user_id,
                &ctx.event.student_id,
                &ctx.event.behavior_id,
                ctx.event.event_time,
            )
            .await
        {
            warn!(user_id = %user_id, error = %e, "Behavior notification record failed");
        }
    });
    join_all(writes).await;

    ChannelOutcome::Sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{BehaviorEvent, DeviceKind, EventSource};
    use crate::student::StudentProfile;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    struct RecordingLog {
        records: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl NotificationLog for RecordingLog {
        async fn record(
            &self,
            user_id: &str,
            student_id: &str,
            behavior_id: &str,
            _at: DateTime<Utc>,
        ) -> Result<()> {
            self.records.lock().unwrap().push((
                user_id.to_string(),
                student_id.to_string(),
                behavior_id.to_string(),
            ));
            Ok(())
        }
    }

    fn fixtures() -> (RecordingLog, StudentProfile, BehaviorEvent) {
        let log = RecordingLog {
            records: Mutex::new(Vec::new()),
        };
        let student = StudentProfile {
            id: "s1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            nickname: None,
            behaviors: Vec::new(),
            responses: Vec::new(),
        };
        let event = BehaviorEvent::new(
            "s1",
            "b1",
            Utc::now(),
            EventSource {
                device: DeviceKind::App,
                rater_id: "d1".to_string(),
            },
        );
        (log, student, event)
    }

    #[tokio::test]
    async fn test_records_once_per_user() {
        let (log, student, event) = fixtures();
        let ctx = DispatchContext {
            event: &event,
            student: &student,
            behavior_name: "Pacing",
            started: Some(true),
            is_response: false,
            skip_behavior_log: false,
        };

        let users = vec!["u1".to_string(), "u2".to_string(), "u1".to_string()];
        let outcome = deliver(&log, &users, &ctx).await;

        assert_eq!(outcome, ChannelOutcome::Sent);
        assert_eq!(log.records.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duration_stop_suppresses_record() {
        let (log, student, event) = fixtures();
        let ctx = DispatchContext {
            event: &event,
            student: &student,
            behavior_name: "Pacing",
            started: Some(false),
            is_response: false,
            skip_behavior_log: false,
        };

        let users = vec!["u1".to_string()];
        let outcome = deliver(&log, &users, &ctx).await;

        assert!(matches!(outcome, ChannelOutcome::Skipped(_)));
        assert!(log.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_renotify_suppresses_record() {
        let (log, student, event) = fixtures();
        let ctx = DispatchContext {
            event: &event,
            student: &student,
            behavior_name: "Pacing",
            started: None,
            is_response: false,
            skip_behavior_log: true,
        };

        let users = vec!["u1".to_string()];
        let outcome = deliver(&log, &users, &ctx).await;

        assert!(matches!(outcome, ChannelOutcome::Skipped(_)));
        assert!(log.records.lock().unwrap().is_empty());
    }
}

//! Duration 行为的开始/结束判定
//!
//! 仅用于消息文案，不决定是否发送。

use crate::event::BehaviorEvent;
use crate::student::BehaviorDefinition;

/// 判定 duration 行为本次发生是开始还是结束
///
/// 非 duration 行为返回 `None`。duration 行为取相关奇偶字段：
/// 白天行为看当天奇偶，否则看当周奇偶；奇偶为 0 表示开始。
pub fn duration_started(
    definition: Option<&BehaviorDefinition>,
    event: &BehaviorEvent,
) -> Option<bool> {
    let is_duration = definition.map(|d| d.is_duration).unwrap_or(event.is_duration);
    if !is_duration {
        return None;
    }

    let daytime = definition.map(|d| d.daytime).unwrap_or(false);
    let parity = if daytime {
        event.day_parity
    } else {
        event.week_parity
    };
    Some(parity == 0)
}

/// 文案后缀（" has started" / " has stopped"）
pub fn started_suffix(started: Option<bool>) -> &'static str {
    match started {
        Some(true) => " has started",
        Some(false) => " has stopped",
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DeviceKind, EventSource};
    use chrono::Utc;

    fn event(day_parity: u8, week_parity: u8) -> BehaviorEvent {
        BehaviorEvent::new(
            "s1",
            "b1",
            Utc::now(),
            EventSource {
                device: DeviceKind::App,
                rater_id: "d1".to_string(),
            },
        )
        .with_parity(day_parity, week_parity)
    }

    fn definition(is_duration: bool, daytime: bool) -> BehaviorDefinition {
        BehaviorDefinition {
            id: "b1".to_string(),
            name: "Pacing".to_string(),
            is_duration,
            daytime,
        }
    }

    #[test]
    fn test_non_duration_behavior_has_no_state() {
        let def = definition(false, true);
        assert_eq!(duration_started(Some(&def), &event(0, 0)), None);
    }

    #[test]
    fn test_daytime_behavior_uses_day_parity() {
        let def = definition(true, true);
        assert_eq!(duration_started(Some(&def), &event(0, 1)), Some(true));
        assert_eq!(duration_started(Some(&def), &event(1, 0)), Some(false));
    }

    #[test]
    fn test_overnight_behavior_uses_week_parity() {
        let def = definition(true, false);
        assert_eq!(duration_started(Some(&def), &event(1, 0)), Some(true));
        assert_eq!(duration_started(Some(&def), &event(0, 1)), Some(false));
    }

    #[test]
    fn test_missing_definition_falls_back_to_event_flag() {
        assert_eq!(duration_started(None, &event(0, 0).with_duration(true)), Some(true));
        assert_eq!(duration_started(None, &event(0, 0)), None);
    }

    #[test]
    fn test_suffix() {
        assert_eq!(started_suffix(Some(true)), " has started");
        assert_eq!(started_suffix(Some(false)), " has stopped");
        assert_eq!(started_suffix(None), "");
    }
}

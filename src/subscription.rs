//! 订阅组定义与匹配
//!
//! 订阅组把一组触发行为绑定到收件人与消息模板；匹配器从学生的
//! 订阅列表中筛出关心当前事件的子集，并预先计算升级资格。
//! 匹配纯函数化，无副作用；空输入视为"无匹配"而非错误。

use crate::event::BehaviorEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// 各渠道的消息模板
///
/// 渠道模板缺省时退回 default；两者都缺省的渠道不产生消息。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageTemplates {
    /// 兜底模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// App 推送模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// 邮件模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 短信模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MessageTemplates {
    fn pick<'a>(&'a self, channel: &'a Option<String>) -> Option<&'a str> {
        channel
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.default.as_deref().filter(|t| !t.trim().is_empty()))
    }

    /// App 渠道生效模板
    pub fn effective_app(&self) -> Option<&str> {
        self.pick(&self.app)
    }

    /// 邮件渠道生效模板
    pub fn effective_email(&self) -> Option<&str> {
        self.pick(&self.email)
    }

    /// 短信渠道生效模板
    pub fn effective_text(&self) -> Option<&str> {
        self.pick(&self.text)
    }
}

/// 通知订阅组
///
/// `id` 是跨流程关联用的稳定键；`name` 仅用于展示，改名不影响
/// 在途的延迟复查。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionGroup {
    /// 稳定标识
    pub id: Uuid,
    /// 展示名称
    pub name: String,
    /// 触发行为集合
    pub behavior_ids: HashSet<String>,
    /// 可接受的回应行为集合
    #[serde(default)]
    pub response_ids: HashSet<String>,
    /// 是否持续提醒直到收到回应
    #[serde(default)]
    pub notify_until_response: bool,
    /// 邮件收件人
    #[serde(default)]
    pub emails: Vec<String>,
    /// 短信号码
    #[serde(default)]
    pub mobiles: Vec<String>,
    /// 用户 ID（App 内标记 + 推送路由）
    #[serde(default)]
    pub user_ids: Vec<String>,
    /// 注册设备 ID
    #[serde(default)]
    pub device_ids: Vec<String>,
    /// 消息模板
    #[serde(default)]
    pub templates: MessageTemplates,
}

impl SubscriptionGroup {
    /// 该订阅是否具备升级资格：配置了回应集合且要求持续提醒
    pub fn escalation_eligible(&self) -> bool {
        !self.response_ids.is_empty() && self.notify_until_response
    }
}

/// 匹配结果：订阅组 + 升级资格标记
///
/// 资格在任何渠道发送之前计算，与发送结果无关。
#[derive(Debug, Clone)]
pub struct MatchedSubscription {
    pub group: SubscriptionGroup,
    pub escalation_eligible: bool,
}

/// 从订阅列表中筛出关心该事件的订阅
pub fn match_subscriptions(
    event: &BehaviorEvent,
    subscriptions: &[SubscriptionGroup],
) -> Vec<MatchedSubscription> {
    subscriptions
        .iter()
        .filter(|s| s.behavior_ids.contains(&event.behavior_id))
        .map(|s| MatchedSubscription {
            escalation_eligible: s.escalation_eligible(),
            group: s.clone(),
        })
        .collect()
}

//! 学生档案与日报表记录结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 行为/回应定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorDefinition {
    /// 行为 ID
    pub id: String,
    /// 展示名称
    pub name: String,
    /// 是否为 duration 行为
    #[serde(default)]
    pub is_duration: bool,
    /// 是否为白天行为（决定用当天奇偶还是当周奇偶）
    #[serde(default)]
    pub daytime: bool,
}

/// 学生档案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    /// 学生 ID
    pub id: String,
    /// 名
    pub first_name: String,
    /// 姓
    pub last_name: String,
    /// 昵称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// 追踪的行为定义
    #[serde(default)]
    pub behaviors: Vec<BehaviorDefinition>,
    /// 可作为回应的行为定义
    #[serde(default)]
    pub responses: Vec<BehaviorDefinition>,
}

impl StudentProfile {
    /// 全名
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 昵称，缺省时退回名
    pub fn nickname_or_first(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.first_name)
    }

    /// 按 ID 查找行为或回应定义
    pub fn definition(&self, behavior_id: &str) -> Option<&BehaviorDefinition> {
        self.behaviors
            .iter()
            .chain(self.responses.iter())
            .find(|d| d.id == behavior_id)
    }

    /// 该 ID 是否为回应类行为
    pub fn is_response(&self, behavior_id: &str) -> bool {
        self.responses.iter().any(|d| d.id == behavior_id)
    }
}

/// 日报表中的一条行为发生记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorOccurrence {
    /// 行为 ID
    pub behavior_id: String,
    /// 发生时间
    pub event_time: DateTime<Utc>,
    /// 是否已被删除
    #[serde(default)]
    pub deleted: bool,
}

/// 团队成员的行为访问权限
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorAccess {
    /// 不受限制
    Unrestricted,
    /// 仅允许列表内的行为
    Allowed(HashSet<String>),
}

impl BehaviorAccess {
    /// 该权限是否覆盖指定行为
    pub fn allows(&self, behavior_id: &str) -> bool {
        match self {
            BehaviorAccess::Unrestricted => true,
            BehaviorAccess::Allowed(ids) => ids.contains(behavior_id),
        }
    }
}

/// 学生团队成员
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    /// 用户 ID
    pub user_id: String,
    /// 行为访问权限
    pub access: BehaviorAccess,
}

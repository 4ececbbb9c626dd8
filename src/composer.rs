//! 消息渲染 - 把模板和事件上下文变成各渠道的消息文本
//!
//! 占位符大小写不敏感：{FirstName} {LastName} {Nickname}
//! {WhoTracked} {Behavior} {StudentName}。
//! {WhoTracked} 的取值需要一次网络查询，只在生效模板确实引用它时
//! 才解析，且同一轮通知内至多解析一次。

use crate::event::EventSource;
use crate::ports::SourceResolverSet;
use crate::student::StudentProfile;
use crate::subscription::MessageTemplates;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tokio::sync::OnceCell;
use tracing::warn;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"(?i)\{(FirstName|LastName|Nickname|WhoTracked|Behavior|StudentName)\}")
            .expect("placeholder pattern is valid")
    })
}

/// 模板是否引用 {WhoTracked}
fn references_who_tracked(template: &str) -> bool {
    template.to_ascii_lowercase().contains("{whotracked}")
}

/// 占位符替换
pub fn render_template(
    template: &str,
    student: &StudentProfile,
    behavior_name: &str,
    who_tracked: &str,
) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            match caps[1].to_ascii_lowercase().as_str() {
                "firstname" => student.first_name.clone(),
                "lastname" => student.last_name.clone(),
                "nickname" => student.nickname_or_first().to_string(),
                "whotracked" => who_tracked.to_string(),
                "behavior" => behavior_name.to_string(),
                "studentname" => student.full_name(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// 渲染结果，每个有生效模板的渠道一条
#[derive(Debug, Clone, Default)]
pub struct ComposedMessage {
    pub app: Option<String>,
    pub email: Option<String>,
    pub text: Option<String>,
}

/// 消息渲染器
pub struct MessageComposer {
    resolvers: SourceResolverSet,
}

impl MessageComposer {
    pub fn new(resolvers: SourceResolverSet) -> Self {
        Self { resolvers }
    }

    /// 渲染一个订阅组的各渠道消息
    ///
    /// `who_cache` 由一轮通知共享，保证来源名称查询至多发生一次。
    pub async fn compose(
        &self,
        templates: &MessageTemplates,
        student: &StudentProfile,
        behavior_name: &str,
        source: &EventSource,
        who_cache: &OnceCell<String>,
    ) -> ComposedMessage {
        let effective = [
            templates.effective_app(),
            templates.effective_email(),
            templates.effective_text(),
        ];
        let needs_who = effective
            .iter()
            .flatten()
            .any(|t| references_who_tracked(t));

        let who_tracked = if needs_who {
            who_cache
                .get_or_init(|| async {
                    match self.resolvers.resolve(source).await {
                        Ok(name) => name,
                        Err(e) => {
                            warn!(
                                rater_id = %source.rater_id,
                                error = %e,
                                "Source name lookup failed, falling back to rater id"
                            );
                            source.rater_id.clone()
                        }
                    }
                })
                .await
                .as_str()
        } else {
            ""
        };

        ComposedMessage {
            app: templates
                .effective_app()
                .map(|t| render_template(t, student, behavior_name, who_tracked)),
            email: templates
                .effective_email()
                .map(|t| render_template(t, student, behavior_name, who_tracked)),
            text: templates
                .effective_text()
                .map(|t| render_template(t, student, behavior_name, who_tracked)),
        }
    }
}

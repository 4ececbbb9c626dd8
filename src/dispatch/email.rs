//! 邮件渠道
//!
//! 没有渲染出邮件正文时从模板仓库拉兜底 HTML 模板并代入学生
//! 姓名。邮件不是尽力而为渠道：模板拉取或发送失败都以 Failed
//! 形式出现在结果里，但只影响本渠道。

use super::{dedup, ChannelOutcome, DispatchContext};
use crate::composer::{render_template, ComposedMessage};
use crate::ports::{EmailGateway, TemplateStore};
use tracing::error;

/// 兜底邮件模板在模板仓库中的路径
const FALLBACK_TEMPLATE_PATH: &str = "notifications/behavior-alert.html";

pub(crate) async fn deliver(
    gateway: &dyn EmailGateway,
    templates: &dyn TemplateStore,
    emails: &[String],
    message: &ComposedMessage,
    ctx: &DispatchContext<'_>,
) -> ChannelOutcome {
    let addresses = dedup(emails);
    if addresses.is_empty() {
        return ChannelOutcome::Skipped("no email recipients".to_string());
    }

    let body = match &message.email {
        Some(body) => body.clone(),
        None => match templates.fetch(FALLBACK_TEMPLATE_PATH).await {
            Ok(template) => render_template(&template, ctx.student, ctx.behavior_name, ""),
            Err(e) => {
                error!(path = FALLBACK_TEMPLATE_PATH, error = %e, "Fallback template fetch failed");
                return ChannelOutcome::Failed(format!("template fetch: {e}"));
            }
        },
    };

    let subject = format!("Behavior alert for {}", ctx.student.full_name());
    match gateway.send_email(&addresses, &subject, &body).await {
        Ok(()) => ChannelOutcome::Sent,
        Err(e) => {
            error!(error = %e, "Email send failed");
            ChannelOutcome::Failed(e.to_string())
        }
    }
}

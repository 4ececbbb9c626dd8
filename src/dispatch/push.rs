//! App 推送渠道
//!
//! 每台注册设备单独查端点，未注册的静默跳过。payload 按平台
//! 组装：iOS 走 aps alert，Android 走 data map。回应类事件用
//! "行为 for 名字" 的短格式，行为事件用渲染好的正文。
//! 发送失败只记日志，推送是尽力而为渠道。

use super::{dedup, ChannelOutcome, DispatchContext};
use crate::composer::ComposedMessage;
use crate::duration::started_suffix;
use crate::ports::{PushGateway, PushPlatform};
use serde_json::json;
use tracing::{debug, warn};

fn ios_payload(title: &str, body: &str) -> serde_json::Value {
    json!({
        "aps": {
            "alert": { "title": title, "body": body },
            "sound": "default"
        }
    })
}

fn android_payload(title: &str, body: &str) -> serde_json::Value {
    json!({
        "data": { "title": title, "message": body },
        "priority": "high"
    })
}

/// 推送正文
///
/// 回应事件不依赖模板，行为事件没有 App 模板就不推。
fn push_body(message: &ComposedMessage, ctx: &DispatchContext<'_>) -> Option<String> {
    let base = if ctx.is_response {
        format!("{} for {}", ctx.behavior_name, ctx.student.first_name)
    } else {
        message.app.clone()?
    };
    Some(format!("{}{}", base, started_suffix(ctx.started)))
}

pub(crate) async fn deliver(
    gateway: &dyn PushGateway,
    device_ids: &[String],
    message: &ComposedMessage,
    ctx: &DispatchContext<'_>,
) -> ChannelOutcome {
    let devices = dedup(device_ids);
    if devices.is_empty() {
        return ChannelOutcome::Skipped("no registered devices".to_string());
    }

    let body = match push_body(message, ctx) {
        Some(b) => b,
        None => return ChannelOutcome::Skipped("no app template".to_string()),
    };
    let title = ctx.student.full_name();

    let mut attempted = 0usize;
    for device_id in &devices {
        let endpoint = match gateway.lookup_endpoint(device_id).await {
            Ok(Some(ep)) => ep,
            Ok(None) => {
                debug!(device_id = %device_id, "No push endpoint on file, skipping");
                continue;
            }
            Err(e) => {
                warn!(device_id = %device_id, error = %e, "Push endpoint lookup failed");
                continue;
            }
        };

        let payload = match endpoint.platform {
            PushPlatform::Ios => ios_payload(&title, &body),
            PushPlatform::Android => android_payload(&title, &body),
        };

        attempted += 1;
        if let Err(e) = gateway.send_push(&endpoint.endpoint_ref, payload).await {
            // 推送失败不重试也不上抛
            warn!(device_id = %device_id, error = %e, "Push send failed");
        }
    }

    if attempted > 0 {
        ChannelOutcome::Sent
    } else {
        ChannelOutcome::Skipped("no push endpoints on file".to_string())
    }
}

//! 短信渠道
//!
//! 正文后固定追加退订提示，与模板来源无关。发送失败只记日志。

use super::{dedup, ChannelOutcome, DispatchContext};
use crate::composer::ComposedMessage;
use crate::ports::SmsGateway;
use tracing::warn;

/// 合规要求的退订尾注
const OPT_OUT_FOOTER: &str = "Reply STOP to unsubscribe.";

pub(crate) async fn deliver(
    gateway: &dyn SmsGateway,
    mobiles: &[String],
    message: &ComposedMessage,
    _ctx: &DispatchContext<'_>,
) -> ChannelOutcome {
    let numbers = dedup(mobiles);
    if numbers.is_empty() {
        return ChannelOutcome::Skipped("no sms recipients".to_string());
    }

    let body = match &message.text {
        Some(text) => format!("{}\n{}", text, OPT_OUT_FOOTER),
        None => return ChannelOutcome::Skipped("no text template".to_string()),
    };

    match gateway.send_sms(&numbers, &body).await {
        Ok(()) => ChannelOutcome::Sent,
        Err(e) => {
            warn!(error = %e, "SMS send failed");
            ChannelOutcome::Failed(e.to_string())
        }
    }
}

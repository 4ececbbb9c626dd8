//! 传输类协作方接口
//!
//! 推送和短信是尽力而为渠道，邮件发送失败必须向上抛出。

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 推送平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushPlatform {
    Ios,
    Android,
}

/// 设备的推送端点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEndpoint {
    /// 平台（决定 payload 形状）
    pub platform: PushPlatform,
    /// 端点引用（平台侧的注册句柄）
    pub endpoint_ref: String,
}

/// 移动推送网关
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// 查询设备的推送端点，未注册返回 `None`
    async fn lookup_endpoint(&self, device_id: &str) -> Result<Option<PushEndpoint>>;

    /// 发送平台格式的推送 payload
    async fn send_push(&self, endpoint_ref: &str, payload: serde_json::Value) -> Result<()>;
}

/// 邮件网关。发送失败必须返回 Err
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send_email(&self, addresses: &[String], subject: &str, html_body: &str)
        -> Result<()>;
}

/// 短信网关
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, numbers: &[String], body: &str) -> Result<()>;
}

/// 外部模板仓库（邮件兜底模板等）
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String>;
}

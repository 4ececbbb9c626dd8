//! 平台网关 HTTP 适配器
//!
//! 延迟调度和模板仓库走同一个内部网关的 REST 接口。

use crate::event::EscalationState;
use crate::ports::{DelayScheduler, TemplateStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// 网关客户端配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 网关地址 (如 http://localhost:9080)
    pub base_url: String,
    /// 认证 token
    pub api_token: String,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9080".to_string(),
            api_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// 延迟调度请求载荷
#[derive(Debug, Serialize)]
struct ScheduleRequest<'a> {
    /// 最小延迟（秒）
    delay_seconds: i64,
    /// 复查状态，触发时原样回投
    payload: &'a EscalationState,
}

/// 网关响应
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// 网关客户端
#[derive(Debug)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            bail!("api_token is required");
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl DelayScheduler for GatewayClient {
    async fn schedule(&self, state: EscalationState, delay: Duration) -> Result<()> {
        let url = format!("{}/v1/schedules", self.config.base_url);
        let body = ScheduleRequest {
            delay_seconds: delay.num_seconds(),
            payload: &state,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("schedule request failed: HTTP {}", response.status());
        }
        let parsed: GatewayResponse = response.json().await?;
        if !parsed.ok {
            bail!(
                "schedule rejected: {}",
                parsed.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateStore for GatewayClient {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}/v1/templates/{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("template fetch failed: HTTP {}", response.status());
        }
        Ok(response.text().await?)
    }
}

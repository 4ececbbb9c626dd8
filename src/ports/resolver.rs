//! 来源展示名称解析
//!
//! 三种设备类型各自有独立的名称解析实现（App 设备名、
//! 实体设备名、Web 用户展示名），按事件来源选择。解析需要
//! 网络调用，调用方负责按需惰性触发。

use crate::event::{DeviceKind, EventSource};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 单一设备类型的名称解析器
#[async_trait]
pub trait SourceNameResolver: Send + Sync {
    async fn display_name(&self, rater_id: &str) -> Result<String>;
}

/// 按设备类型路由的解析器集合
#[derive(Clone)]
pub struct SourceResolverSet {
    app: Arc<dyn SourceNameResolver>,
    legacy_device: Arc<dyn SourceNameResolver>,
    web: Arc<dyn SourceNameResolver>,
}

impl SourceResolverSet {
    pub fn new(
        app: Arc<dyn SourceNameResolver>,
        legacy_device: Arc<dyn SourceNameResolver>,
        web: Arc<dyn SourceNameResolver>,
    ) -> Self {
        Self {
            app,
            legacy_device,
            web,
        }
    }

    /// 解析事件来源的展示名称
    pub async fn resolve(&self, source: &EventSource) -> Result<String> {
        let resolver = match source.device {
            DeviceKind::App => &self.app,
            DeviceKind::LegacyDevice => &self.legacy_device,
            DeviceKind::Web => &self.web,
        };
        resolver.display_name(&source.rater_id).await
    }
}

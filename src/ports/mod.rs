//! 外部协作方接口
//!
//! 引擎只依赖这些 trait，不依赖具体实现：
//! 1. 存储类：订阅配置、学生档案、日报表、团队、提醒标记、通知记录
//! 2. 传输类：推送、邮件、短信、模板仓库
//! 3. 来源名称解析：按设备类型注入三种实现
//! 4. 延迟触发器：承载复查状态的持久定时器
//!
//! 全部以 `Arc<dyn …>` 注入，测试用内存实现替换。

pub mod resolver;
pub mod stores;
pub mod timer;
pub mod transport;

pub use resolver::{SourceNameResolver, SourceResolverSet};
pub use stores::{
    AlertFlagStore, NotificationLog, ReportStore, StudentDirectory, SubscriptionStore, TeamRoster,
};
pub use timer::DelayScheduler;
pub use transport::{
    EmailGateway, PushEndpoint, PushGateway, PushPlatform, SmsGateway, TemplateStore,
};

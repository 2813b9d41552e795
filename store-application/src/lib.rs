//! 门店命令应用层（store-application）
//!
//! 串起异步命令调度协议的两端：
//! - 网关侧：`CommandPublisher` 把请求组装为命令信封并发布到队列；
//! - 存储侧：`CommandConsumer` 拉取消息，`CommandDispatcher` 解码并路由到
//!   `StoreService`，结果经 `ResultNotifier` 带外回调网关。
//!
//! 另提供两个服务进程共用的配置加载、日志初始化与退出信号。
//!
pub mod command;
pub mod config;
pub mod consumer;
pub mod context;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod notifier;
pub mod publisher;
pub mod result;
pub mod retry;
pub mod service;
pub mod shutdown;
pub mod telemetry;

pub use consumer::{CommandConsumer, ConsumerConfig, ConsumerHandle};
pub use dispatcher::CommandDispatcher;
pub use notifier::{HttpResultNotifier, ResultNotifier};
pub use publisher::CommandPublisher;
pub use retry::RetryPolicy;
pub use service::StoreService;

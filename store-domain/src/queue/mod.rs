//! 命令队列（CommandQueue）
//!
//! 网关与存储服务之间唯一的通道：网关发布序列化后的命令消息，存储服务的消费循环
//! 以 'static 生命周期的流逐条取出。投递语义为至少一次，不同生产者之间不保证顺序；
//! 消息在收到时即被确认。
//!
//! - `InMemoryCommandQueue`：基于 `tokio::sync::mpsc` 的进程内实现，用于测试与本地开发；
//! - `AmqpCommandQueue`（`infra-amqp` 特性）：基于 lapin 的 AMQP 实现。
//!
#[cfg(feature = "infra-amqp")]
mod amqp;
mod inmemory;

#[cfg(feature = "infra-amqp")]
pub use amqp::AmqpCommandQueue;
pub use inmemory::InMemoryCommandQueue;

use crate::error::DomainResult;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use std::sync::Arc;

/// 约定的命令队列名
pub const COMMAND_QUEUE: &str = "CreateQueue";

#[async_trait]
pub trait CommandQueue: Send + Sync {
    async fn publish(&self, payload: &[u8]) -> DomainResult<()>;

    /// 返回一个 'static 生命周期的消息流，便于在 tokio::spawn 中使用
    async fn consume(&self) -> DomainResult<BoxStream<'static, DomainResult<Vec<u8>>>>;
}

#[async_trait]
impl<T> CommandQueue for Arc<T>
where
    T: CommandQueue + ?Sized,
{
    async fn publish(&self, payload: &[u8]) -> DomainResult<()> {
        (**self).publish(payload).await
    }

    async fn consume(&self) -> DomainResult<BoxStream<'static, DomainResult<Vec<u8>>>> {
        (**self).consume().await
    }
}

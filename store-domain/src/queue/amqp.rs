//! AMQP 命令队列（AmqpCommandQueue）
//!
//! 基于 lapin 的实现：通过默认交换机按队列名路由；消费端使用 `no_ack`，
//! 即消息在收到时确认，处理中途崩溃会丢失该命令。
//!
use crate::error::{DomainError, DomainResult};
use crate::queue::CommandQueue;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use lapin::options::{BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};

pub struct AmqpCommandQueue {
    // 持有连接以保持通道存活
    _connection: Connection,
    channel: Channel,
    queue: String,
}

impl AmqpCommandQueue {
    /// 连接代理并声明队列
    #[tracing::instrument(skip(uri))]
    pub async fn connect(uri: &str, queue: &str) -> DomainResult<Self> {
        let connection = Connection::connect(uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;
        tracing::info!(queue, "amqp queue declared");

        Ok(Self {
            _connection: connection,
            channel,
            queue: queue.to_string(),
        })
    }
}

#[async_trait]
impl CommandQueue for AmqpCommandQueue {
    async fn publish(&self, payload: &[u8]) -> DomainResult<()> {
        self.channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await?
            .await?;
        Ok(())
    }

    async fn consume(&self) -> DomainResult<BoxStream<'static, DomainResult<Vec<u8>>>> {
        let consumer = self
            .channel
            .basic_consume(
                &self.queue,
                "store-storage",
                BasicConsumeOptions {
                    no_ack: true,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(Box::pin(consumer.map(|delivery| {
            delivery
                .map(|d| d.data)
                .map_err(DomainError::from)
        })))
    }
}

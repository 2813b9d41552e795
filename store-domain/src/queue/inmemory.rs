//! 内存版命令队列（InMemoryCommandQueue）
//!
//! 基于 `tokio::sync::mpsc` 的单消费者队列，满足 `CommandQueue` 协议：
//! - `publish`：拷贝负载并入队，队列满时等待；
//! - `consume`：取走唯一的接收端并包装为 `'static` 消息流，重复调用返回错误。
//!
//! 可通过 `close()` 模拟代理断开，此后发布失败，已入队的消息仍会被消费完。

use crate::error::{DomainError, DomainResult};
use crate::queue::CommandQueue;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;

pub struct InMemoryCommandQueue {
    tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    rx: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
}

impl InMemoryCommandQueue {
    /// 创建一个内存队列，`capacity` 为缓冲区容量
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
        }
    }

    /// 关闭发送端
    pub async fn close(&self) {
        self.tx.lock().await.take();
    }
}

#[async_trait]
impl CommandQueue for InMemoryCommandQueue {
    async fn publish(&self, payload: &[u8]) -> DomainResult<()> {
        let tx = self
            .tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| DomainError::queue("queue is closed"))?;
        tx.send(payload.to_vec())
            .await
            .map_err(|e| DomainError::queue(e.to_string()))
    }

    async fn consume(&self) -> DomainResult<BoxStream<'static, DomainResult<Vec<u8>>>> {
        let rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| DomainError::queue("queue already has a consumer"))?;
        Ok(Box::pin(ReceiverStream::new(rx).map(Ok)))
    }
}

//! 命令消费引擎（CommandConsumer）
//!
//! 单一消费循环：订阅队列消息流，按配置的并发上限交给调度器处理：
//! - 每个处理单元各自执行事务，单元之间不共享可变状态；
//! - 取消信号到达后停止拉取并退出循环，不等待队列排空；
//! - 提供关闭与等待的 `ConsumerHandle`。
//!
use std::sync::Arc;

use bon::Builder;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use store_domain::error::DomainResult;
use store_domain::persist::VersionChainRepository;
use store_domain::queue::CommandQueue;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::CommandDispatcher;
use crate::error::{AppError, AppResult};

/// 消费引擎配置
#[derive(Clone, Copy, Debug)]
pub struct ConsumerConfig {
    /// 同时处理的消息数上限
    pub concurrency: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

#[derive(Builder)]
pub struct CommandConsumer<R> {
    queue: Arc<dyn CommandQueue>,
    dispatcher: Arc<CommandDispatcher<R>>,
    #[builder(default)]
    config: ConsumerConfig,
}

impl<R> CommandConsumer<R>
where
    R: VersionChainRepository + 'static,
{
    /// 订阅队列并启动消费循环，返回可用于关闭/等待的句柄
    pub async fn start(self: Arc<Self>) -> AppResult<ConsumerHandle> {
        let token = CancellationToken::new();
        let stream = self.queue.consume().await.map_err(AppError::from)?;
        let task = tokio::spawn(Self::consume_loop(self.clone(), stream, token.clone()));
        tracing::info!(concurrency = self.config.concurrency, "command consumer started");
        Ok(ConsumerHandle { token, task: Some(task) })
    }

    async fn consume_loop(
        self: Arc<Self>,
        stream: BoxStream<'static, DomainResult<Vec<u8>>>,
        token: CancellationToken,
    ) {
        let concurrency = self.config.concurrency.max(1);
        let dispatcher = self.dispatcher.clone();

        let work = stream.for_each_concurrent(Some(concurrency), move |delivery| {
            let dispatcher = dispatcher.clone();
            async move {
                match delivery {
                    Ok(payload) => {
                        dispatcher.handle(&payload).await;
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to receive message");
                    }
                }
            }
        });

        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("command consumer cancelled");
            }
            _ = work => {
                tracing::warn!("command stream closed");
            }
        }
    }
}

/// 消费循环句柄：用于关闭与等待循环结束
pub struct ConsumerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// 等待循环自行结束（消息流关闭），不发出取消
    pub async fn stopped(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
        }
        self.task = None;
    }

    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! 命令发布器（CommandPublisher）
//!
//! 把已校验的请求与调用者身份组装为命令信封并发布到队列。
//! 相对 HTTP 响应是“发出即忘”：成功仅表示已受理，不代表已执行。
//!
use std::sync::Arc;
use std::time::Duration;

use store_domain::queue::CommandQueue;

use crate::command::{CommandMessage, StoreCommand};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

pub struct CommandPublisher {
    queue: Arc<dyn CommandQueue>,
    timeout: Duration,
}

impl CommandPublisher {
    pub fn new(queue: Arc<dyn CommandQueue>, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    /// 发布命令；发布失败或超时返回 `AppError::Delivery`
    #[tracing::instrument(
        skip(self, ctx, command),
        fields(action = %command.action(), login = %ctx.login, request_id = ctx.request_id.as_deref())
    )]
    pub async fn publish(&self, ctx: &AppContext, command: &StoreCommand) -> AppResult<()> {
        let payload = CommandMessage::new(&ctx.login, command)?.encode()?;

        match tokio::time::timeout(self.timeout, self.queue.publish(&payload)).await {
            Ok(Ok(())) => {
                tracing::info!("command published");
                Ok(())
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "failed to publish command");
                Err(AppError::Delivery(err.to_string()))
            }
            Err(_) => {
                tracing::error!(timeout = ?self.timeout, "publishing command timed out");
                Err(AppError::Delivery(format!(
                    "publish timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use futures_core::stream::BoxStream;
    use futures_util::StreamExt;
    use store_domain::error::{DomainError, DomainResult};
    use store_domain::queue::InMemoryCommandQueue;
    use store_domain::value_object::{Login, StoreId, VersionId};

    fn ctx() -> AppContext {
        AppContext::new(Login::new("user1").unwrap()).with_request_id("req-1")
    }

    #[tokio::test]
    async fn published_message_reaches_queue() {
        let queue = Arc::new(InMemoryCommandQueue::new(4));
        let publisher = CommandPublisher::new(queue.clone(), Duration::from_secs(1));

        publisher
            .publish(
                &ctx(),
                &StoreCommand::GetVersion {
                    store_id: StoreId::new(1),
                    version_id: VersionId::new(2),
                },
            )
            .await
            .unwrap();

        let mut stream = queue.consume().await.unwrap();
        let raw = stream.next().await.unwrap().unwrap();
        let msg = CommandMessage::decode(&raw).unwrap();
        assert_eq!(msg.store_id, "1");
        assert_eq!(msg.version_id, "2");
        assert_eq!(msg.user_login, "user1");
    }

    #[tokio::test]
    async fn broker_failure_is_delivery_error() {
        let queue = Arc::new(InMemoryCommandQueue::new(4));
        queue.close().await;
        let publisher = CommandPublisher::new(queue, Duration::from_secs(1));

        let err = publisher
            .publish(
                &ctx(),
                &StoreCommand::DeleteStore {
                    store_id: StoreId::new(1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Delivery);
    }

    struct Stalled;

    #[async_trait]
    impl CommandQueue for Stalled {
        async fn publish(&self, _payload: &[u8]) -> DomainResult<()> {
            std::future::pending().await
        }
        async fn consume(&self) -> DomainResult<BoxStream<'static, DomainResult<Vec<u8>>>> {
            Err(DomainError::queue("not consumable"))
        }
    }

    #[tokio::test]
    async fn stalled_broker_times_out() {
        let publisher = CommandPublisher::new(Arc::new(Stalled), Duration::from_millis(20));
        let err = publisher
            .publish(
                &ctx(),
                &StoreCommand::GetStore {
                    store_id: StoreId::new(1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Delivery);
    }
}

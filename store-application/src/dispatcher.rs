//! 命令调度器（CommandDispatcher）
//!
//! 无状态，逐条处理消息：
//! - 信封解码失败（非法 JSON、未知动作、缺失/非法 id、负载格式错误）记录日志后丢弃，
//!   不重试也不回调；
//! - 按动作穷尽匹配到唯一的服务操作，单条命令的执行受 `command_timeout` 约束，
//!   超时按内部错误回传；
//! - 成功产生成功结果，领域错误回传错误文本，意外错误回传通用文本；
//! - 结果通过 `ResultNotifier` 投递，投递失败只记录日志。
//!
use std::sync::Arc;
use std::time::Duration;

use store_domain::persist::VersionChainRepository;

use crate::command::{CommandMessage, StoreCommand};
use crate::context::AppContext;
use crate::dto::{StoreDto, StoreVersionDto};
use crate::error::{AppError, AppResult};
use crate::notifier::ResultNotifier;
use crate::result::ResultMessage;
use crate::service::StoreService;

pub const STORE_CREATED: &str = "Store created successfully";
pub const VERSION_CREATED: &str = "Store version created successfully";
pub const STORE_DELETED: &str = "Store deleted successfully";
pub const VERSION_DELETED: &str = "Store version deleted successfully";

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CommandDispatcher<R> {
    service: Arc<StoreService<R>>,
    notifier: Arc<dyn ResultNotifier>,
    command_timeout: Duration,
}

impl<R> CommandDispatcher<R>
where
    R: VersionChainRepository,
{
    pub fn new(service: Arc<StoreService<R>>, notifier: Arc<dyn ResultNotifier>) -> Self {
        Self {
            service,
            notifier,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    /// 处理一条队列消息；被丢弃时返回 `None`
    pub async fn handle(&self, payload: &[u8]) -> Option<ResultMessage> {
        tracing::info!(message = %String::from_utf8_lossy(payload), "received message");

        let message = match CommandMessage::decode(payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecodable message");
                return None;
            }
        };
        let action = message.action;
        let (login, command) = match message.into_command() {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(%action, error = %err, "dropping malformed command");
                return None;
            }
        };

        let ctx = AppContext::new(login);
        let result = match self.execute_within_deadline(&ctx, command).await {
            Ok(result) => {
                tracing::info!(%action, login = %ctx.login, "command succeeded");
                result
            }
            Err(err) => {
                tracing::error!(%action, login = %ctx.login, kind = ?err.kind(), error = %err, "command failed");
                ResultMessage::error(err.public_message())
            }
        };

        if let Err(err) = self.notifier.notify(&result).await {
            tracing::error!(%action, error = %err, "failed to deliver result to gateway");
        }
        Some(result)
    }

    async fn execute_within_deadline(
        &self,
        ctx: &AppContext,
        command: StoreCommand,
    ) -> AppResult<ResultMessage> {
        tokio::time::timeout(self.command_timeout, self.execute(ctx, command))
            .await
            .map_err(|_| {
                AppError::Infra(format!(
                    "command timed out after {} ms",
                    self.command_timeout.as_millis()
                ))
            })?
    }

    async fn execute(&self, ctx: &AppContext, command: StoreCommand) -> AppResult<ResultMessage> {
        let service = &self.service;
        match command {
            StoreCommand::CreateStore(attrs) => {
                service.create_store(ctx, &attrs).await?;
                Ok(ResultMessage::text(STORE_CREATED))
            }
            StoreCommand::CreateVersion { store_id, attrs } => {
                service.create_version(ctx, store_id, &attrs).await?;
                Ok(ResultMessage::text(VERSION_CREATED))
            }
            StoreCommand::DeleteStore { store_id } => {
                service.delete_store(ctx, store_id).await?;
                Ok(ResultMessage::text(STORE_DELETED))
            }
            StoreCommand::DeleteVersion {
                store_id,
                version_id,
            } => {
                service.delete_version(ctx, store_id, version_id).await?;
                Ok(ResultMessage::text(VERSION_DELETED))
            }
            StoreCommand::GetStore { store_id } => {
                let store = service.get_store(store_id).await?;
                ResultMessage::payload(&StoreDto::from(&store)).map_err(internal)
            }
            StoreCommand::GetHistory { store_id } => {
                let history: Vec<StoreVersionDto> = service
                    .version_history(store_id)
                    .await?
                    .iter()
                    .map(StoreVersionDto::from)
                    .collect();
                ResultMessage::list(&history).map_err(internal)
            }
            StoreCommand::GetVersion {
                store_id,
                version_id,
            } => {
                let version = service.get_version(store_id, version_id).await?;
                ResultMessage::payload(&StoreVersionDto::from(&version)).map_err(internal)
            }
        }
    }
}

fn internal(err: serde_json::Error) -> AppError {
    AppError::Infra(err.to_string())
}

//! 启动与装配
//!
//! - `connect_postgres`：按重试策略建立连接池（会话带 `statement_timeout`），随后执行幂等建表；
//! - `connect_queue`：按重试策略连接代理并声明命令队列；
//! - `build_consumer`：装配服务层、结果回调、调度器与消费引擎；
//! - `run_until`：运行消费循环直到退出信号或消息流关闭。
//!
use std::future::Future;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use store_application::config::RabbitConfig;
use store_application::error::{AppError, AppResult};
use store_application::{
    CommandConsumer, CommandDispatcher, HttpResultNotifier, ResultNotifier, StoreService,
};
use store_domain::error::{DomainError, DomainResult};
use store_domain::persist::{PgVersionChainRepository, VersionChainRepository};
use store_domain::queue::{AmqpCommandQueue, CommandQueue};
use tracing::{info, warn};

use crate::config::{PostgresConfig, StorageConfig};

#[tracing::instrument(skip_all, fields(host = %config.host, dbname = %config.dbname))]
pub async fn connect_postgres(config: &PostgresConfig) -> DomainResult<PgVersionChainRepository> {
    let options = config.connect_options();
    let pool = config
        .connect
        .policy()
        .run("postgres connect", || {
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect_with(options.clone())
        })
        .await
        .map_err(DomainError::from)?;
    info!("connected to postgres");

    let repo = PgVersionChainRepository::new(pool);
    repo.migrate().await?;
    info!("schema ready");
    Ok(repo)
}

#[tracing::instrument(skip_all, fields(host = %config.host, queue = %config.queue))]
pub async fn connect_queue(config: &RabbitConfig) -> DomainResult<AmqpCommandQueue> {
    let uri = config.uri();
    config
        .connect
        .policy()
        .run("amqp connect", || AmqpCommandQueue::connect(&uri, &config.queue))
        .await
}

pub fn build_consumer<R>(
    repo: R,
    queue: Arc<dyn CommandQueue>,
    config: &StorageConfig,
) -> AppResult<Arc<CommandConsumer<R>>>
where
    R: VersionChainRepository + 'static,
{
    let notifier: Arc<dyn ResultNotifier> = Arc::new(HttpResultNotifier::new(
        config.gateway.url(),
        config.gateway.timeout(),
    )?);
    build_consumer_with(repo, queue, notifier, config)
}

/// 与 `build_consumer` 相同，但由调用方提供结果回调
pub fn build_consumer_with<R>(
    repo: R,
    queue: Arc<dyn CommandQueue>,
    notifier: Arc<dyn ResultNotifier>,
    config: &StorageConfig,
) -> AppResult<Arc<CommandConsumer<R>>>
where
    R: VersionChainRepository + 'static,
{
    let service = Arc::new(StoreService::new(repo, config.conflict_retry.policy()));
    let dispatcher = Arc::new(
        CommandDispatcher::new(service, notifier)
            .with_command_timeout(config.consumer.command_timeout()),
    );
    Ok(Arc::new(
        CommandConsumer::builder()
            .queue(queue)
            .dispatcher(dispatcher)
            .config(config.consumer.into())
            .build(),
    ))
}

/// 运行消费循环；退出信号到达时正常返回，消息流自行关闭时返回错误
pub async fn run_until<R, F>(consumer: Arc<CommandConsumer<R>>, shutdown: F) -> AppResult<()>
where
    R: VersionChainRepository + 'static,
    F: Future<Output = ()>,
{
    let mut handle = consumer.start().await?;
    info!("waiting for messages");

    let stream_closed = tokio::select! {
        _ = shutdown => false,
        _ = handle.stopped() => true,
    };
    if !stream_closed {
        info!("shutdown signal received");
        handle.shutdown();
    }
    handle.join().await;

    if stream_closed {
        warn!("command stream closed unexpectedly");
        return Err(AppError::Infra("command stream closed".into()));
    }
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use store_application::shutdown::shutdown_signal;
use store_application::telemetry::{self, AppEnv};
use store_storage::StorageConfig;
use store_storage::bootstrap::{build_consumer, connect_postgres, connect_queue, run_until};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "store-storage", about = "Command consumer for the store registry")]
struct Cli {
    /// 配置文件路径
    #[arg(long, env = "STORAGE_CONFIG", default_value = "configs/storage.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = AppEnv::from_env();
    telemetry::init_tracing(env, "store_storage=info,store_application=info,store_domain=info")?;

    let config = StorageConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let repo = connect_postgres(&config.postgres)
        .await
        .context("failed to establish database connection")?;
    let queue = connect_queue(&config.rabbit)
        .await
        .context("failed to establish amqp connection")?;

    let consumer = build_consumer(repo, Arc::new(queue), &config)
        .context("failed to build command consumer")?;
    info!(environment = %env, callback = %config.gateway.url(), "store storage started");

    run_until(consumer, shutdown_signal()).await?;

    info!("store storage stopped");
    Ok(())
}

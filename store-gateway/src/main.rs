use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use store_application::shutdown::shutdown_signal;
use store_application::telemetry::{self, AppEnv};
use store_application::CommandPublisher;
use store_domain::queue::AmqpCommandQueue;
use store_gateway::auth::{AuthProviderClient, AuthService, StaticUserDirectory};
use store_gateway::server::serve_with_grace;
use store_gateway::{AppState, GatewayConfig, build_router};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "store-gateway", about = "HTTP gateway for the store registry")]
struct Cli {
    /// 配置文件路径
    #[arg(long, env = "GATEWAY_CONFIG", default_value = "configs/gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = AppEnv::from_env();
    telemetry::init_tracing(env, "store_gateway=info,store_application=info,tower_http=info")?;

    let config = GatewayConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let provider = Arc::new(
        AuthProviderClient::new(&config.auth).context("failed to build auth provider client")?,
    );
    provider
        .ping()
        .await
        .context("failed to connect to auth provider")?;

    let rabbit = &config.rabbit;
    let uri = rabbit.uri();
    let queue = rabbit
        .connect
        .policy()
        .run("amqp connect", || AmqpCommandQueue::connect(&uri, &rabbit.queue))
        .await
        .context("failed to establish amqp connection")?;

    let publisher = Arc::new(CommandPublisher::new(
        Arc::new(queue),
        config.publish.timeout(),
    ));
    let auth = Arc::new(AuthService::new(
        Arc::new(StaticUserDirectory::default()),
        provider.clone(),
    ));
    let router = build_router(AppState::new(publisher, provider, auth));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, environment = %env, "store gateway started");

    serve_with_grace(
        listener,
        router,
        shutdown_signal(),
        config.server.shutdown_grace(),
    )
    .await
    .context("server error")?;

    info!("store gateway stopped");
    Ok(())
}

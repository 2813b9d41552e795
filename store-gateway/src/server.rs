use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// 运行 HTTP 服务直到 `shutdown` 完成；之后最多再等 `grace` 让在途请求结束
pub async fn serve_with_grace<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    grace: Duration,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(token.clone().cancelled_owned())
        .into_future();

    let deadline = async {
        shutdown.await;
        tracing::info!(grace = ?grace, "shutting down server");
        token.cancel();
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        served = server => served,
        _ = deadline => {
            tracing::warn!("grace period elapsed, dropping open connections");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn stops_after_shutdown_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_with_grace(
            listener,
            router,
            async move {
                let _ = rx.await;
            },
            Duration::from_secs(1),
        ));
        tx.send(()).unwrap();

        let served = tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .unwrap()
            .unwrap();
        assert!(served.is_ok());
    }
}

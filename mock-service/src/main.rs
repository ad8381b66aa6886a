use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mock_service=debug".to_string()),
        )
        .init();

    let metrics_addr: SocketAddr = std::env::var("MOCK_SERVICE_METRICS_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8002".to_string())
        .parse()?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;

    let addr: SocketAddr = std::env::var("MOCK_SERVICE_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3002".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mock service listening on {addr}");

    mock_service::run(listener).await?;
    Ok(())
}

//! Shared helpers for the integration tests.
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Address of a mock service shared by every test in the binary.
///
/// The service runs on its own thread and runtime so that it outlives the per-test runtimes.
pub fn mock_addr() -> SocketAddr {
    static ADDR: OnceLock<SocketAddr> = OnceLock::new();

    *ADDR.get_or_init(|| {
        init_tracing();

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to build mock service runtime");

            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind mock service");
                let addr = listener.local_addr().expect("Mock service has no address");
                let _ = tx.send(addr);

                if let Err(err) = mock_service::run(listener).await {
                    error!("Mock service stopped: {err}");
                }
            });
        });

        rx.recv().expect("Mock service failed to start")
    })
}

pub fn url(path: &str) -> String {
    format!("http://{}{path}", mock_addr())
}

pub fn init_tracing() {
    let _ = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("surge=debug,mock_service=debug")),
        )
        .with_test_writer()
        .try_init();
}

use mock_server::Store;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("127.0.0.1:{port}");
    let store = if std::env::var("MOCK_EMPTY").is_ok() {
        Store::new()
    } else {
        Store::seeded()
    };
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("mock lang-portal backend listening on http://{addr}/api");
    mock_server::run_with(listener, store).await
}

//! Bingohall server binary.

use bingohall::{BingoError, BingohallServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BingoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("BINGOHALL_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = BingohallServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "starting Bingohall");
    server.run().await
}

use abi::Config;
use anyhow::anyhow;
use reservation_service::start_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "reservation_service=info,reservation=info,tower_http=info".into()
        }))
        .init();

    let filename = Config::locate().ok_or_else(|| {
        anyhow!("no config file: set RESERVATION_CONFIG or create ./reservation.yml")
    })?;
    let config = Config::load(&filename)?;
    tracing::info!("Loaded config from {filename}");

    start_server(&config).await
}

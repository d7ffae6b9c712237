mod api_client;
mod config;
mod formatting;
mod models;
mod presenter;
mod services;

use api_client::ApiClient;
use config::Config;
use services::display_service::{run_display, REFRESH_TICK};
use services::poll_service::start_polling;
use services::snapshot_service::SnapshotBuilder;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::info!("Block status endpoint: {}", config.stats_url);
    tracing::info!("Price endpoint: {}", config.price_url);
    tracing::info!("Merge policy: {:?}", config.merge_policy);

    let client = ApiClient::new(
        config.stats_url.clone(),
        config.price_url.clone(),
        config.stats_schema.clone(),
        config.request_timeout,
    )?;
    let builder = SnapshotBuilder::new(client, config.merge_policy);

    // Single slot: the next snapshot waits until the display loop has taken the last one
    let (tx, rx) = mpsc::channel(1);

    // Spawn snapshot polling task
    tokio::spawn(start_polling(builder, config.schedule, tx));

    run_display(rx, config.presenter.build(), REFRESH_TICK).await;
    Ok(())
}

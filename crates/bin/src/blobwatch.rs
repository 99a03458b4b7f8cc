//! blobwatch - headless viewer binary

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("blobwatch v{}", env!("CARGO_PKG_VERSION"));

    let mut config = client::InterpolationConfig::load()?;
    if let Some(url) = std::env::args().nth(1) {
        config.server_url = url;
    }
    info!(
        "Playback: tick {}ms, slack {}ms, flexibility {}, {} fps",
        config.tick_period_ms, config.slack_ms, config.flexibility, config.draw_rate
    );

    client::viewer::run(config).await
}

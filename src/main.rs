use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use homefeed::application::PrefetchService;
use homefeed::domain::ConnectionStatus;
use homefeed::infrastructure::{
    AppConfig, CliArgs, ConnectionMonitor, HttpImageFetcher, ImageCacheManager, RestBackendClient,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let reset_connection = args.reset_connection;
    let config = AppConfig::load(args)?;

    init_logging(&config)?;
    info!(version = homefeed::VERSION, "Starting homefeed");

    let backend_url = config.require_backend_url()?;
    let api_key = config.api_key.clone().unwrap_or_default();

    let backend = Arc::new(RestBackendClient::new(
        backend_url,
        api_key,
        config.request_timeout(),
    )?);
    let monitor = Arc::new(ConnectionMonitor::new());
    if reset_connection {
        monitor.reset();
    }

    let fetcher = Arc::new(HttpImageFetcher::new(config.request_timeout())?);
    let cache = ImageCacheManager::new(fetcher, config.prefetch.preload_config());

    let status = monitor.check_connection(backend.as_ref()).await;
    match status {
        ConnectionStatus::Healthy => println!("Connection: healthy"),
        ConnectionStatus::Degraded => {
            println!("Connection: degraded - the backend is not responding, try again shortly");
        }
        ConnectionStatus::Blocked => {
            println!(
                "Connection: blocked - your network appears to block the backend; \
                 a VPN may help"
            );
            return Ok(());
        }
    }

    let service = PrefetchService::new(
        backend,
        cache.clone(),
        monitor,
        config.retry.policy(),
    );

    let report = service
        .warm_listings(config.prefetch.listing_limit)
        .await?;

    println!(
        "Prefetched {} listings: {}/{} images cached, {} queued",
        report.listings, report.images_cached, report.images_requested, report.images_pending
    );

    // Let the background queue finish before the process exits. The queue
    // empties when the last batch is popped, so wait out its loads too.
    while cache.pending_count() > 0 || cache.loading_count() > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    println!("{}", cache.stats());

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anime_notifier::{
    config::Config,
    history::HistoryStore,
    poller::{Poller, Scheduler},
};

#[derive(Parser)]
#[command(name = "anime-notifier")]
#[command(version)]
#[command(about = "Polls an anime listing page and posts new episodes to a webhook")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listing page URL (overrides config file)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Webhook URL (overrides config file)
    #[arg(long, value_name = "URL")]
    webhook_url: Option<String>,

    /// History file path (overrides config file)
    #[arg(long, value_name = "PATH")]
    history_path: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("anime_notifier={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting anime notifier v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(source_url) = cli.source_url {
        config.source.url = source_url;
    }
    if let Some(webhook_url) = cli.webhook_url {
        config.webhook.url = webhook_url;
    }
    if let Some(history_path) = cli.history_path {
        config.storage.history_path = history_path;
    }
    config.validate()?;

    // A corrupt history file stops startup instead of being overwritten
    let history = HistoryStore::load(&config.storage.history_path, config.storage.max_history)?;
    let mut poller = Poller::from_config(&config, history)?;

    if cli.once {
        let outcome = poller.run_cycle().await;
        info!("Single cycle finished: {:?}", outcome);
        return Ok(());
    }

    let scheduler = Scheduler::new(poller, config.polling.interval);
    scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}

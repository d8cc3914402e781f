use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use torn_watch::api::TornClient;
use torn_watch::config::{AppConfig, CONFIG_PATH};
use torn_watch::monitor::Monitor;
use torn_watch::notify::DiscordWebhook;

#[derive(Parser)]
#[command(name = "torn-watch", about = "Torn account watcher with Discord alerts")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "TORN_WATCH_CONFIG", default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    config.validate()?;
    info!(
        "Loaded config from {} ({} account(s))",
        args.config.display(),
        config.accounts.len()
    );

    let timeout = config.settings.request_timeout();
    let source = TornClient::new(config.settings.api_base.clone(), timeout)?;
    let sink = DiscordWebhook::new(timeout)?;
    let mut monitor = Monitor::new(source, sink, config);

    if args.once {
        let report = monitor.run_cycle().await;
        info!(
            "Single cycle done: {} evaluated, {} skipped, {} delivered",
            report.evaluated, report.skipped, report.delivered
        );
        return Ok(());
    }

    monitor.run().await
}

//! Probe: Torn user endpoint
//!
//! Fetches one selection for a configured account and documents:
//! - Response shape and fields
//! - Latency over repeated requests
//! - The snapshot the monitor would build from it

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use torn_watch::api::{Selection, TornClient, build_snapshot};
use torn_watch::config::{AppConfig, CONFIG_PATH};

#[derive(Parser)]
#[command(name = "probe_user", about = "Dump raw Torn user selections for an account")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "TORN_WATCH_CONFIG", default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Configured account ID
    #[arg(long)]
    id: String,

    /// Selection to fetch; both are fetched when omitted
    #[arg(long, value_enum)]
    selection: Option<Selection>,

    /// Number of requests per selection
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    let account = config
        .account(&args.id)
        .with_context(|| format!("account {} not in {}", args.id, args.config.display()))?;
    let client = TornClient::new(
        config.settings.api_base.clone(),
        config.settings.request_timeout(),
    )?;

    println!("=== Probe: Torn user endpoint ===");
    println!("Account: {}", account.id);
    println!();

    let selections = match args.selection {
        Some(s) => vec![s],
        None => vec![Selection::Profile, Selection::Travel],
    };

    let mut bodies = Vec::new();
    for selection in selections {
        println!("--- {selection} ({}) ---", selection.url(&config.settings.api_base, &account.id));
        let mut last = None;
        for i in 0..args.repeat.max(1) {
            let start = Instant::now();
            let result = client.fetch_selection(account, selection).await;
            let latency = start.elapsed();
            match result {
                Ok(body) => {
                    println!("Request {}: ok (latency: {:?})", i + 1, latency);
                    last = Some(body);
                }
                Err(e) => println!("Request {}: {e} (latency: {:?})", i + 1, latency),
            }
        }
        if let Some(body) = last {
            println!("{}", serde_json::to_string_pretty(&body)?);
            if let Some(obj) = body.as_object() {
                println!("\nFields present:");
                for key in obj.keys() {
                    println!("  - {}", key);
                }
            }
            bodies.push((selection, body));
        }
        println!();
    }

    let profile = bodies.iter().find(|(s, _)| *s == Selection::Profile);
    let travel = bodies.iter().find(|(s, _)| *s == Selection::Travel);
    if let (Some((_, profile)), Some((_, travel))) = (profile, travel) {
        println!("--- Snapshot ---");
        match build_snapshot(profile.clone(), travel.clone()) {
            Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
            Err(e) => println!("Could not build snapshot: {e}"),
        }
    }

    Ok(())
}

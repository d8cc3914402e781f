//! setup-account: Add or update a tracked account in `config.toml`.
//!
//! Validates the API key by fetching the profile selection, prints the
//! resolved player name, and writes the account into the config file.
//! A missing config file is created with default settings.
//!
//! By default, reads the API key interactively (hidden input) to avoid
//! leaking it into shell history. Use `--api-key` only for scripted use.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use torn_watch::api::{Selection, TornClient};
use torn_watch::config::{AppConfig, CONFIG_PATH, SettingsConfig, TrackedAccount, validate_webhook};

#[derive(Parser)]
#[command(
    name = "setup-account",
    about = "Validate a Torn API key and save the account to config.toml"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "TORN_WATCH_CONFIG", default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Torn player ID to track
    #[arg(long)]
    id: String,

    /// Discord webhook URL for this account's alerts
    #[arg(long)]
    webhook: String,

    /// Energy value treated as full for this account
    #[arg(long)]
    energy_capacity: Option<u32>,

    /// API key. If omitted, reads interactively with hidden input (recommended).
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut app_config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        println!("{} not found, starting a new one", cli.config.display());
        AppConfig {
            settings: SettingsConfig::default(),
            accounts: Vec::new(),
        }
    };

    println!("=== torn-watch: Account Setup ===\n");

    validate_webhook(&cli.webhook).context("invalid --webhook")?;

    // ── Step 1: Read API key ───────────────────────────────────────
    let api_key = match cli.api_key {
        Some(key) => key,
        None => {
            let key = rpassword::prompt_password("Enter Torn API key: ")
                .context("failed to read API key")?;
            if key.trim().is_empty() {
                bail!("API key cannot be empty");
            }
            key
        }
    };

    let account = TrackedAccount {
        id: cli.id.trim().to_string(),
        api_key: api_key.trim().to_string(),
        webhook: cli.webhook,
        energy_capacity: cli.energy_capacity,
    };

    // ── Step 2: Validate against the API ───────────────────────────
    println!("Checking key against {}...", app_config.settings.api_base);
    let client = TornClient::new(
        app_config.settings.api_base.clone(),
        app_config.settings.request_timeout(),
    )?;
    let profile = client
        .fetch_selection(&account, Selection::Profile)
        .await
        .context("profile fetch failed")?;
    let name = profile
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown");
    println!("  Player:  {name} [{}]", account.id);

    client
        .fetch_selection(&account, Selection::Travel)
        .await
        .context("travel fetch failed; the key must belong to this player")?;
    println!("  Travel:  readable");

    // ── Step 3: Save ───────────────────────────────────────────────
    app_config.upsert_account(account);
    app_config.validate()?;
    app_config.save(&cli.config)?;
    println!(
        "\nSaved {} ({} account(s) tracked)",
        cli.config.display(),
        app_config.accounts.len()
    );

    Ok(())
}

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{DEFAULT_ENERGY_CAPACITY, TORN_API_BASE};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Tracked accounts, processed in this order every cycle.
    #[serde(default)]
    pub accounts: Vec<TrackedAccount>,
}

/// One monitored Torn account and where its alerts go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedAccount {
    /// Torn player ID.
    pub id: String,
    /// API key owned by this player (needs the travel selection).
    pub api_key: String,
    /// Discord webhook URL.
    pub webhook: String,
    /// Overrides `settings.energy_capacity` for this account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_capacity: Option<u32>,
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Poll interval in seconds when no reminder is pending.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Poll interval in seconds while any account has a pending reminder.
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,
    /// Energy value treated as "full".
    #[serde(default = "default_energy_capacity")]
    pub energy_capacity: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Timeout in seconds for each upstream or webhook request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_check_interval() -> u64 {
    60
}

fn default_reminder_interval() -> u64 {
    30
}

fn default_energy_capacity() -> u32 {
    DEFAULT_ENERGY_CAPACITY
}

fn default_api_base() -> String {
    TORN_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval(),
            reminder_interval_secs: default_reminder_interval(),
            energy_capacity: default_energy_capacity(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SettingsConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Energy capacity for an account, honoring its override.
    pub fn energy_capacity_for(&self, account: &TrackedAccount) -> u32 {
        account.energy_capacity.unwrap_or(self.energy_capacity)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reject configs the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            bail!("no accounts configured");
        }
        if self.settings.check_interval_secs == 0 || self.settings.reminder_interval_secs == 0 {
            bail!("poll intervals must be positive");
        }
        if self.settings.energy_capacity == 0 {
            bail!("energy_capacity must be positive");
        }
        url::Url::parse(&self.settings.api_base)
            .with_context(|| format!("invalid api_base {}", self.settings.api_base))?;

        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.id.trim().is_empty() {
                bail!("account with empty id");
            }
            if !seen.insert(account.id.as_str()) {
                bail!("account {} is listed more than once", account.id);
            }
            if account.api_key.trim().is_empty() {
                bail!("account {} has an empty api_key", account.id);
            }
            if account.energy_capacity == Some(0) {
                bail!("account {} has energy_capacity = 0", account.id);
            }
            validate_webhook(&account.webhook)
                .with_context(|| format!("account {} has an invalid webhook", account.id))?;
        }

        if self.settings.reminder_interval_secs > self.settings.check_interval_secs {
            warn!(
                "reminder_interval_secs ({}) is longer than check_interval_secs ({}); pending reminders will slow polling down",
                self.settings.reminder_interval_secs, self.settings.check_interval_secs
            );
        }
        Ok(())
    }

    /// Insert an account, replacing any existing entry with the same id in place.
    pub fn upsert_account(&mut self, account: TrackedAccount) {
        match self.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => self.accounts.push(account),
        }
    }

    pub fn account(&self, id: &str) -> Option<&TrackedAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }
}

/// Webhook must be an absolute http(s) URL.
pub fn validate_webhook(webhook: &str) -> Result<()> {
    let url = url::Url::parse(webhook).context("not a URL")?;
    match url.scheme() {
        "https" | "http" => Ok(()),
        other => bail!("unsupported scheme {other}"),
    }
}

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::TrackedAccount;
use crate::types::{Snapshot, StatusState, TravelState};

/// Failure to obtain a usable snapshot for one account.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure. The request URL is stripped since it carries the API key.
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("Torn API error {code}: {message}")]
    Upstream { code: i64, message: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Source of account snapshots.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_snapshot(&self, account: &TrackedAccount) -> Result<Snapshot, FetchError>;
}

/// Named data group requested from the user endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Selection {
    /// Name, status, cash on hand, cooldowns and bars.
    Profile,
    /// Travel sub-state. Private to the key owner.
    Travel,
}

impl Selection {
    /// Comma-separated `selections` query value.
    pub fn fields(self) -> &'static str {
        match self {
            Self::Profile => "basic,money,cooldowns,bars",
            Self::Travel => "travel",
        }
    }

    /// Endpoint URL. Travel is read from the key owner's own record.
    pub fn url(self, base: &str, account_id: &str) -> String {
        let base = base.trim_end_matches('/');
        match self {
            Self::Profile => format!("{base}/user/{account_id}"),
            Self::Travel => format!("{base}/user/"),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fields())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfilePayload {
    name: Option<String>,
    #[serde(default)]
    status: StatusPayload,
    #[serde(default)]
    energy: BarPayload,
    #[serde(default)]
    money_onhand: Decimal,
    #[serde(default)]
    cooldowns: CooldownsPayload,
}

#[derive(Debug, Default, Deserialize)]
struct StatusPayload {
    state: Option<String>,
    #[serde(default)]
    until: i64,
}

#[derive(Debug, Default, Deserialize)]
struct BarPayload {
    #[serde(default)]
    current: u32,
}

#[derive(Debug, Default, Deserialize)]
struct CooldownsPayload {
    #[serde(default)]
    drug: u64,
    #[serde(default)]
    booster: u64,
    #[serde(default)]
    medical: u64,
}

#[derive(Debug, Default, Deserialize)]
struct TravelEnvelope {
    travel: Option<TravelPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct TravelPayload {
    #[serde(default)]
    time_left: u64,
    destination: Option<String>,
    method: Option<String>,
}

/// Map an `{"error": {"code", "error"}}` body to `FetchError::Upstream`.
pub fn check_upstream_error(body: &Value) -> Result<(), FetchError> {
    let Some(err) = body.get("error") else {
        return Ok(());
    };
    let code = err.get("code").and_then(Value::as_i64).unwrap_or(-1);
    let message = err
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Err(FetchError::Upstream { code, message })
}

fn decode<T: for<'de> Deserialize<'de>>(body: Value, selection: Selection) -> Result<T, FetchError> {
    if !body.is_object() {
        return Err(FetchError::Malformed(format!(
            "{selection} response is not a JSON object"
        )));
    }
    serde_json::from_value(body)
        .map_err(|e| FetchError::Malformed(format!("{selection} response: {e}")))
}

/// Combine the profile and travel responses into one snapshot.
pub fn build_snapshot(profile: Value, travel: Value) -> Result<Snapshot, FetchError> {
    check_upstream_error(&profile)?;
    check_upstream_error(&travel)?;
    let profile: ProfilePayload = decode(profile, Selection::Profile)?;
    let travel: TravelEnvelope = decode(travel, Selection::Travel)?;

    let status = profile
        .status
        .state
        .as_deref()
        .map(StatusState::from_label)
        .unwrap_or_else(|| StatusState::Other("Unknown".to_string()));

    let travel = match travel.travel {
        Some(t) => TravelState {
            time_left: t.time_left,
            destination: t.destination.unwrap_or_else(|| "Unknown".to_string()),
            method: t.method.unwrap_or_else(|| "Unknown".to_string()),
        },
        None => TravelState::default(),
    };

    Ok(Snapshot {
        name: profile.name.filter(|n| !n.trim().is_empty()),
        energy: profile.energy.current,
        cash_on_hand: profile.money_onhand,
        drug_cooldown: profile.cooldowns.drug,
        booster_cooldown: profile.cooldowns.booster,
        medical_cooldown: profile.cooldowns.medical,
        status,
        status_until: profile.status.until,
        travel,
    })
}

/// HTTP client for the Torn user endpoint.
pub struct TornClient {
    http: reqwest::Client,
    base: String,
}

impl TornClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base: base.into(),
        })
    }

    /// Fetch one selection, returning the decoded JSON body.
    ///
    /// Upstream error bodies are mapped to `FetchError::Upstream`.
    pub async fn fetch_selection(
        &self,
        account: &TrackedAccount,
        selection: Selection,
    ) -> Result<Value, FetchError> {
        let url = selection.url(&self.base, &account.id);
        debug!("Fetching {url}?selections={selection} for {}", account.id);

        let resp = self
            .http
            .get(&url)
            .query(&[("selections", selection.fields()), ("key", account.api_key.as_str())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let text = resp.text().await?;
        debug!("Raw {selection} response for {}: {text}", account.id);

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("invalid JSON: {e}")))?;
        check_upstream_error(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl DataSource for TornClient {
    async fn fetch_snapshot(&self, account: &TrackedAccount) -> Result<Snapshot, FetchError> {
        let profile = self.fetch_selection(account, Selection::Profile).await?;
        let travel = self.fetch_selection(account, Selection::Travel).await?;
        build_snapshot(profile, travel)
    }
}

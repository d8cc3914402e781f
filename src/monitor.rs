use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api::{DataSource, FetchError};
use crate::config::{AppConfig, SettingsConfig, TrackedAccount};
use crate::engine;
use crate::notify::NotificationSink;
use crate::reporter;
use crate::scheduler;
use crate::state::{AccountState, StateStore};

/// Outcome of one pass over all tracked accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub evaluated: usize,
    /// Accounts whose fetch failed; their state was left untouched.
    pub skipped: usize,
    pub events: usize,
    pub delivered: usize,
    pub next_interval: Duration,
}

/// Owns the per-account state and drives fetch → evaluate → notify cycles.
pub struct Monitor<D, N> {
    source: D,
    sink: N,
    accounts: Vec<TrackedAccount>,
    settings: SettingsConfig,
    store: StateStore,
}

impl<D: DataSource, N: NotificationSink> Monitor<D, N> {
    pub fn new(source: D, sink: N, config: AppConfig) -> Self {
        Self {
            source,
            sink,
            accounts: config.accounts,
            settings: config.settings,
            store: StateStore::new(),
        }
    }

    /// Run one cycle against the current wall clock.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle, processing accounts in configuration order.
    ///
    /// A failed fetch skips only that account.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport {
            evaluated: 0,
            skipped: 0,
            events: 0,
            delivered: 0,
            next_interval: Duration::ZERO,
        };

        for account in &self.accounts {
            let state = self.store.entry(&account.id);
            match process_account(&self.source, &self.sink, &self.settings, account, state, now)
                .await
            {
                Ok((events, delivered)) => {
                    report.evaluated += 1;
                    report.events += events;
                    report.delivered += delivered;
                }
                Err(e) => {
                    warn!("[{}] Skipping account this cycle: {e}", account.id);
                    report.skipped += 1;
                }
            }
        }

        report.next_interval = scheduler::next_interval(&self.store, &self.settings);
        report
    }

    /// Poll until Ctrl+C.
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Monitoring {} account(s) (interval: {}s, reminder interval: {}s). Press Ctrl+C to stop.",
            self.accounts.len(),
            self.settings.check_interval_secs,
            self.settings.reminder_interval_secs,
        );

        loop {
            let report = self.run_cycle().await;
            info!(
                "Cycle done: {} evaluated, {} skipped, {} event(s), {} delivered; next poll in {}s",
                report.evaluated,
                report.skipped,
                report.events,
                report.delivered,
                report.next_interval.as_secs(),
            );

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(report.next_interval) => {}
            }
        }

        Ok(())
    }
}

/// Fetch, evaluate and notify for a single account.
///
/// Returns `(events, delivered)`. On a fetch error `state` is not touched.
async fn process_account<D: DataSource + ?Sized, N: NotificationSink + ?Sized>(
    source: &D,
    sink: &N,
    settings: &SettingsConfig,
    account: &TrackedAccount,
    state: &mut AccountState,
    now: DateTime<Utc>,
) -> Result<(usize, usize), FetchError> {
    let snapshot = source.fetch_snapshot(account).await?;

    let capacity = settings.energy_capacity_for(account);
    let eval = engine::evaluate(state, &snapshot, capacity, now);
    let delivered = reporter::dispatch(sink, account, &snapshot, &eval.events).await;

    info!(
        "{}",
        reporter::summary_line(&snapshot.tag(&account.id), &snapshot, &eval.suppression)
    );
    Ok((eval.events.len(), delivered))
}

use std::time::Duration;

use crate::config::SettingsConfig;
use crate::state::StateStore;

/// Sleep before the next cycle.
///
/// A single pending reminder on any account switches every account to the
/// reminder interval.
pub fn next_interval(store: &StateStore, settings: &SettingsConfig) -> Duration {
    if store.any_reminder_active() {
        settings.reminder_interval()
    } else {
        settings.check_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SettingsConfig {
        SettingsConfig {
            check_interval_secs: 60,
            reminder_interval_secs: 15,
            ..SettingsConfig::default()
        }
    }

    #[test]
    fn default_interval_without_reminders() {
        let mut store = StateStore::new();
        store.entry("1");
        store.entry("2").just_triggered.drug = true;
        assert_eq!(next_interval(&store, &settings()), Duration::from_secs(60));
    }

    #[test]
    fn empty_store_uses_default() {
        assert_eq!(next_interval(&StateStore::new(), &settings()), Duration::from_secs(60));
    }

    #[test]
    fn one_reminder_speeds_up_everyone() {
        let mut store = StateStore::new();
        store.entry("1");
        store.entry("2");
        store.entry("3").reminders.cash = true;
        assert_eq!(next_interval(&store, &settings()), Duration::from_secs(15));
    }

    #[test]
    fn drug_reminder_counts_too() {
        let mut store = StateStore::new();
        store.entry("1").reminders.drug = true;
        assert_eq!(next_interval(&store, &settings()), Duration::from_secs(15));
    }
}

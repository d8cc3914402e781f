use std::collections::HashMap;

/// Last-observed signals and reminder bookkeeping for one tracked account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    pub carrying_cash: bool,
    pub in_hospital: bool,
    pub in_jail: bool,
    pub traveling: bool,
    pub energy_full: bool,
    /// `None` until the first successful read. Counts as "not ready" for edge detection.
    pub drug_cooldown: Option<u64>,
    pub booster_cooldown: u64,
    pub medical_cooldown: u64,
    pub reminders: CategoryFlags,
    /// Set only during the evaluation in which the initial alert fired.
    pub just_triggered: CategoryFlags,
}

/// One boolean per reminder-capable category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFlags {
    pub cash: bool,
    pub drug: bool,
}

impl CategoryFlags {
    pub fn any(&self) -> bool {
        self.cash || self.drug
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl AccountState {
    /// Whether this account has a condition that is still waiting on the operator.
    pub fn has_active_reminder(&self) -> bool {
        self.reminders.any()
    }
}

/// Per-account state, keyed by account ID, for the lifetime of the process.
#[derive(Debug, Default)]
pub struct StateStore {
    accounts: HashMap<String, AccountState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account_id: &str) -> Option<&AccountState> {
        self.accounts.get(account_id)
    }

    /// Mutable state for an account, created empty on first access.
    pub fn entry(&mut self, account_id: &str) -> &mut AccountState {
        self.accounts.entry(account_id.to_string()).or_default()
    }

    pub fn any_reminder_active(&self) -> bool {
        self.accounts.values().any(AccountState::has_active_reminder)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_creates_empty_state() {
        let mut store = StateStore::new();
        assert!(store.get("1").is_none());
        let state = store.entry("1");
        assert_eq!(*state, AccountState::default());
        assert_eq!(state.drug_cooldown, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entry_returns_same_state() {
        let mut store = StateStore::new();
        store.entry("1").carrying_cash = true;
        assert!(store.entry("1").carrying_cash);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn any_reminder_active_across_accounts() {
        let mut store = StateStore::new();
        store.entry("1");
        store.entry("2");
        assert!(!store.any_reminder_active());
        store.entry("2").reminders.drug = true;
        assert!(store.any_reminder_active());
        store.entry("2").reminders.clear();
        assert!(!store.any_reminder_active());
    }

    #[test]
    fn just_triggered_does_not_count_as_reminder() {
        let mut store = StateStore::new();
        store.entry("1").just_triggered.cash = true;
        assert!(!store.any_reminder_active());
    }
}

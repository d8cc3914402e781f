use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Coarse status category reported by the profile selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatusState {
    Normal,
    Hospital,
    Jail,
    /// Any other upstream state (Traveling, Abroad, Federal, ...), label kept for logs.
    Other(String),
}

impl StatusState {
    /// Map the upstream `status.state` string to a category.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Okay" => Self::Normal,
            "Hospital" => Self::Hospital,
            "Jail" => Self::Jail,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("Okay"),
            Self::Hospital => f.write_str("Hospital"),
            Self::Jail => f.write_str("Jail"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// Travel sub-state from the travel selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelState {
    /// Seconds until landing; 0 when not in the air.
    pub time_left: u64,
    pub destination: String,
    pub method: String,
}

impl TravelState {
    pub fn is_traveling(&self) -> bool {
        self.time_left > 0
    }
}

impl Default for TravelState {
    fn default() -> Self {
        Self {
            time_left: 0,
            destination: "Unknown".to_string(),
            method: "Unknown".to_string(),
        }
    }
}

/// One point-in-time read of an account, normalized from the profile and
/// travel selections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Resolved display name; `None` when upstream did not resolve identity.
    pub name: Option<String>,
    pub energy: u32,
    pub cash_on_hand: Decimal,
    pub drug_cooldown: u64,
    pub booster_cooldown: u64,
    pub medical_cooldown: u64,
    pub status: StatusState,
    /// Unix timestamp at which the current status ends.
    pub status_until: i64,
    pub travel: TravelState,
}

impl Snapshot {
    pub fn in_hospital(&self) -> bool {
        self.status == StatusState::Hospital
    }

    pub fn in_jail(&self) -> bool {
        self.status == StatusState::Jail
    }

    pub fn carrying_cash(&self) -> bool {
        self.cash_on_hand > Decimal::ZERO
    }

    /// Display tag used in messages and logs: `"{name} [{id}]"`.
    pub fn tag(&self, account_id: &str) -> String {
        let name = self.name.as_deref().unwrap_or("Unknown");
        format!("{name} [{account_id}]")
    }
}

/// A notification produced by the transition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    Departed {
        destination: String,
        method: String,
        eta: DateTime<Utc>,
    },
    Landed,
    Hospitalized {
        eta: DateTime<Utc>,
    },
    LeftHospital,
    Jailed {
        eta: DateTime<Utc>,
    },
    LeftJail,
    CarryingCash,
    DrugCooldownEnded,
    CashReminder,
    DrugReminder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_from_label() {
        assert_eq!(StatusState::from_label("Okay"), StatusState::Normal);
        assert_eq!(StatusState::from_label("Hospital"), StatusState::Hospital);
        assert_eq!(StatusState::from_label("Jail"), StatusState::Jail);
        assert_eq!(
            StatusState::from_label("Abroad"),
            StatusState::Other("Abroad".to_string())
        );
        assert_eq!(StatusState::from_label("Abroad").to_string(), "Abroad");
    }

    #[test]
    fn tag_falls_back_to_unknown() {
        let snap = Snapshot {
            name: None,
            energy: 0,
            cash_on_hand: dec!(0),
            drug_cooldown: 0,
            booster_cooldown: 0,
            medical_cooldown: 0,
            status: StatusState::Normal,
            status_until: 0,
            travel: TravelState::default(),
        };
        assert_eq!(snap.tag("42"), "Unknown [42]");
        let named = Snapshot {
            name: Some("Chedburn".to_string()),
            ..snap
        };
        assert_eq!(named.tag("1"), "Chedburn [1]");
    }
}

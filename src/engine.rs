use chrono::{DateTime, TimeDelta, Utc};

use crate::state::AccountState;
use crate::suppression::Suppression;
use crate::types::{NotificationEvent, Snapshot};

/// Result of evaluating one snapshot against an account's previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Events in emission order.
    pub events: Vec<NotificationEvent>,
    /// Suppression verdict computed for this snapshot.
    pub suppression: Suppression,
}

/// `now + secs`, clamped to `now` when the offset is not representable.
fn eta_after(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}

/// Diff a fresh snapshot against the account's last-observed state.
///
/// Updates `state` in place and returns the notifications to send. Travel,
/// hospital and jail are plain edge triggers. Cash and drug cooldown also
/// maintain reminder flags, gated by the suppression verdict recomputed from
/// this snapshot. Both just-triggered flags are always false on return.
pub fn evaluate(
    state: &mut AccountState,
    snapshot: &Snapshot,
    energy_capacity: u32,
    now: DateTime<Utc>,
) -> Evaluation {
    let mut events = Vec::new();

    // Travel
    let traveling = snapshot.travel.is_traveling();
    if traveling && !state.traveling {
        let secs = i64::try_from(snapshot.travel.time_left).unwrap_or(i64::MAX);
        events.push(NotificationEvent::Departed {
            destination: snapshot.travel.destination.clone(),
            method: snapshot.travel.method.clone(),
            eta: eta_after(now, secs),
        });
    } else if !traveling && state.traveling {
        events.push(NotificationEvent::Landed);
    }
    state.traveling = traveling;

    // Hospital and jail share `status_until`; a past timestamp gives a past ETA.
    let release_secs = snapshot.status_until.saturating_sub(now.timestamp());

    let in_hospital = snapshot.in_hospital();
    if in_hospital && !state.in_hospital {
        events.push(NotificationEvent::Hospitalized {
            eta: eta_after(now, release_secs),
        });
    } else if !in_hospital && state.in_hospital {
        events.push(NotificationEvent::LeftHospital);
    }
    state.in_hospital = in_hospital;

    let in_jail = snapshot.in_jail();
    if in_jail && !state.in_jail {
        events.push(NotificationEvent::Jailed {
            eta: eta_after(now, release_secs),
        });
    } else if !in_jail && state.in_jail {
        events.push(NotificationEvent::LeftJail);
    }
    state.in_jail = in_jail;

    state.energy_full = snapshot.energy == energy_capacity;

    let suppression = Suppression::from_flags(state.energy_full, traveling, in_hospital, in_jail);

    // Cash: a suppressed rising edge is recorded without an alert.
    let carrying_cash = snapshot.carrying_cash();
    if carrying_cash && !state.carrying_cash {
        if !suppression.cash {
            events.push(NotificationEvent::CarryingCash);
            state.reminders.cash = true;
            state.just_triggered.cash = true;
        }
    } else if !carrying_cash && state.carrying_cash {
        state.reminders.cash = false;
        state.just_triggered.cash = false;
    }
    state.carrying_cash = carrying_cash;

    // Drug cooldown: the end notice is unconditional, the reminder is not.
    let drug_ready = snapshot.drug_cooldown == 0;
    let was_ready = state.drug_cooldown == Some(0);
    if drug_ready && !was_ready {
        events.push(NotificationEvent::DrugCooldownEnded);
        state.reminders.drug = !suppression.drug;
        state.just_triggered.drug = !suppression.drug;
    } else if !drug_ready && was_ready {
        state.reminders.drug = false;
        state.just_triggered.drug = false;
    }
    state.drug_cooldown = Some(snapshot.drug_cooldown);
    state.booster_cooldown = snapshot.booster_cooldown;
    state.medical_cooldown = snapshot.medical_cooldown;

    // Suppression lifted while the cooldown was already ready (e.g. after landing).
    if drug_ready && !suppression.drug && !state.reminders.drug {
        state.reminders.drug = true;
        state.just_triggered.drug = true;
    }

    // Reminders
    if state.reminders.cash && !state.just_triggered.cash && !suppression.cash {
        events.push(NotificationEvent::CashReminder);
    }
    if state.reminders.drug && !state.just_triggered.drug && !suppression.drug {
        events.push(NotificationEvent::DrugReminder);
    }
    state.just_triggered.clear();

    Evaluation {
        events,
        suppression,
    }
}

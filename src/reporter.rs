use chrono::{DateTime, Local, Utc};
use tracing::{debug, warn};

use crate::config::TrackedAccount;
use crate::notify::NotificationSink;
use crate::suppression::Suppression;
use crate::types::{NotificationEvent, Snapshot};

/// Wall-clock time of day in local time, e.g. `14:05:09`.
fn format_eta(eta: &DateTime<Utc>) -> String {
    eta.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Render an event as the text posted to the account's channel.
pub fn render(event: &NotificationEvent, tag: &str) -> String {
    match event {
        NotificationEvent::Departed {
            destination,
            method,
            eta,
        } => format!(
            "✈️ {tag} boarded a flight via {method} to {destination}. ETA: {}",
            format_eta(eta)
        ),
        NotificationEvent::Landed => format!("✅ {tag} has landed in Torn."),
        NotificationEvent::Hospitalized { eta } => format!(
            "🏥 {tag} is in hospital. Estimated release: {}",
            format_eta(eta)
        ),
        NotificationEvent::LeftHospital => format!("✅ {tag} has left hospital."),
        NotificationEvent::Jailed { eta } => {
            format!("🚔 {tag} is in jail. Estimated release: {}", format_eta(eta))
        }
        NotificationEvent::LeftJail => format!("✅ {tag} has left jail."),
        NotificationEvent::CarryingCash => format!("💰 {tag} is carrying cash!"),
        NotificationEvent::DrugCooldownEnded => format!("⏰ {tag} drug cooldown ended!"),
        NotificationEvent::CashReminder => format!("💰 Reminder: {tag} is still carrying cash!"),
        NotificationEvent::DrugReminder => {
            format!("💊 Reminder: {tag} drug cooldown is still ready!")
        }
    }
}

/// Deliver events to the account's webhook in order.
///
/// Nothing is sent when the snapshot's name is unresolved. Delivery failures
/// are logged and the remaining events are still attempted. Returns the number
/// of messages delivered.
pub async fn dispatch<N: NotificationSink + ?Sized>(
    sink: &N,
    account: &TrackedAccount,
    snapshot: &Snapshot,
    events: &[NotificationEvent],
) -> usize {
    let tag = snapshot.tag(&account.id);
    let mut delivered = 0;

    for event in events {
        let message = render(event, &tag);
        if snapshot.name.is_none() {
            debug!("Suppressed message for unresolved player: {message}");
            continue;
        }
        match sink.deliver(&account.webhook, &message).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!("[{}] Failed to deliver \"{message}\": {e}", account.id),
        }
    }

    delivered
}

/// One-line per-account cycle summary.
pub fn summary_line(tag: &str, snapshot: &Snapshot, suppression: &Suppression) -> String {
    let labels = suppression.labels();
    let suppressed = if labels.is_empty() {
        "None".to_string()
    } else {
        labels.join(", ")
    };
    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    format!(
        "{tag} | Summary: Energy={}, Cash={}, DrugCD={}, BoosterCD={}, MedicalCD={}, Status={}, Hospital={}, Jail={}, Travel={}, Suppressed=[{suppressed}]",
        snapshot.energy,
        snapshot.cash_on_hand.round(),
        snapshot.drug_cooldown,
        snapshot.booster_cooldown,
        snapshot.medical_cooldown,
        snapshot.status,
        yes_no(snapshot.in_hospital()),
        yes_no(snapshot.in_jail()),
        yes_no(snapshot.travel.is_traveling()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::notify::DeliveryError;
    use crate::types::{StatusState, TravelState};

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
        fail_first: bool,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn deliver(&self, channel: &str, message: &str) -> Result<(), DeliveryError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((channel.to_string(), message.to_string()));
            if self.fail_first && sent.len() == 1 {
                return Err(DeliveryError::Rejected(reqwest::StatusCode::TOO_MANY_REQUESTS));
            }
            Ok(())
        }
    }

    fn account() -> TrackedAccount {
        TrackedAccount {
            id: "2001".to_string(),
            api_key: "k".to_string(),
            webhook: "https://example.com/hook".to_string(),
            energy_capacity: None,
        }
    }

    fn snapshot(name: Option<&str>) -> Snapshot {
        Snapshot {
            name: name.map(str::to_string),
            energy: 740,
            cash_on_hand: dec!(1234.56),
            drug_cooldown: 0,
            booster_cooldown: 60,
            medical_cooldown: 0,
            status: StatusState::Normal,
            status_until: 0,
            travel: TravelState::default(),
        }
    }

    #[test]
    fn render_plain_messages() {
        let tag = "Duke [2001]";
        assert_eq!(render(&NotificationEvent::Landed, tag), "✅ Duke [2001] has landed in Torn.");
        assert_eq!(
            render(&NotificationEvent::CarryingCash, tag),
            "💰 Duke [2001] is carrying cash!"
        );
        assert_eq!(
            render(&NotificationEvent::CashReminder, tag),
            "💰 Reminder: Duke [2001] is still carrying cash!"
        );
        assert_eq!(
            render(&NotificationEvent::DrugCooldownEnded, tag),
            "⏰ Duke [2001] drug cooldown ended!"
        );
        assert_eq!(
            render(&NotificationEvent::DrugReminder, tag),
            "💊 Reminder: Duke [2001] drug cooldown is still ready!"
        );
        assert_eq!(render(&NotificationEvent::LeftJail, tag), "✅ Duke [2001] has left jail.");
    }

    #[test]
    fn render_departure_with_local_eta() {
        let eta = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let event = NotificationEvent::Departed {
            destination: "Cayman Islands".to_string(),
            method: "Business Class".to_string(),
            eta,
        };
        let expected = format!(
            "✈️ Duke [2001] boarded a flight via Business Class to Cayman Islands. ETA: {}",
            eta.with_timezone(&Local).format("%H:%M:%S")
        );
        assert_eq!(render(&event, "Duke [2001]"), expected);
    }

    #[tokio::test]
    async fn dispatch_delivers_in_order() {
        let sink = RecordingSink::default();
        let events = [NotificationEvent::Landed, NotificationEvent::CashReminder];
        let delivered = dispatch(&sink, &account(), &snapshot(Some("Duke")), &events).await;
        assert_eq!(delivered, 2);
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "https://example.com/hook");
        assert_eq!(sent[0].1, "✅ Duke [2001] has landed in Torn.");
        assert_eq!(sent[1].1, "💰 Reminder: Duke [2001] is still carrying cash!");
    }

    #[tokio::test]
    async fn dispatch_drops_unresolved_name() {
        let sink = RecordingSink::default();
        let events = [NotificationEvent::CarryingCash];
        let delivered = dispatch(&sink, &account(), &snapshot(None), &events).await;
        assert_eq!(delivered, 0);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_continues_after_failure() {
        let sink = RecordingSink {
            fail_first: true,
            ..RecordingSink::default()
        };
        let events = [NotificationEvent::LeftHospital, NotificationEvent::DrugReminder];
        let delivered = dispatch(&sink, &account(), &snapshot(Some("Duke")), &events).await;
        assert_eq!(delivered, 1);
        assert_eq!(sink.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn summary_formats_cash_without_decimals() {
        let snap = snapshot(Some("Duke"));
        let suppression = Suppression::from_flags(false, false, false, false);
        assert_eq!(
            summary_line("Duke [2001]", &snap, &suppression),
            "Duke [2001] | Summary: Energy=740, Cash=1235, DrugCD=0, BoosterCD=60, MedicalCD=0, Status=Okay, Hospital=No, Jail=No, Travel=No, Suppressed=[None]"
        );
    }

    #[test]
    fn summary_lists_suppressions() {
        let snap = snapshot(Some("Duke"));
        let suppression = Suppression::from_flags(true, true, false, false);
        let line = summary_line("Duke [2001]", &snap, &suppression);
        assert!(line.ends_with("Suppressed=[Energy, Drug, Booster, Medical, Cash]"));
    }
}

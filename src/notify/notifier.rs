use notify_rust::{Hint, Notification};

use super::{Reminder, ReminderKind};

pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    pub fn notify_reminder(&self, reminder: &Reminder) {
        let start_local = reminder
            .start_time
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        let body = match reminder.kind {
            ReminderKind::Tomorrow => {
                format!("{} — tomorrow at {}", reminder.title, start_local)
            }
            ReminderKind::TwoHours => format!("{} — at {}", reminder.title, start_local),
            ReminderKind::StartingNow => reminder.title.clone(),
        };
        self.show(reminder.kind.headline(), &body);
    }

    pub fn notify_session_expired(&self) {
        self.show(
            "Session expired",
            "Your login is no longer valid. Run `inbox_triage login` to reconnect.",
        );
    }

    fn show(&self, summary: &str, body: &str) {
        let result = Notification::new()
            .summary(summary)
            .body(body)
            .icon("appointment-soon")
            .hint(Hint::Category("event".to_string()))
            .show();
        if let Err(e) = result {
            eprintln!("Notification error: {e}");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

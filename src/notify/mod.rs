//! Meeting-reminder scheduler.
//!
//! A cancellable background task: while running it re-fetches the meeting
//! list on a fixed interval (and once immediately on start) and raises a
//! desktop notification for every meeting whose time-to-start falls inside
//! one of three narrow windows. The window check is a pure function over
//! (meetings, now) so tests can drive ticks without real time passing.
//!
//! The ≈2-minute windows double as de-duplication: a meeting announced on
//! one tick has moved past the window by the next. That is approximate;
//! there is no persisted "already notified" set, so an unlucky tick
//! instant can still double-fire or miss a window entirely.

pub mod notifier;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::{ApiClient, ApiError};
use crate::domain::meeting::Meeting;
use crate::notify::notifier::Notifier;
use crate::session;

/// Poll interval for the meeting watcher (1 minute)
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Slice length for cancellation checks while sleeping
const STOP_POLL_MS: u64 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Tomorrow,
    TwoHours,
    StartingNow,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 3] = [
        ReminderKind::StartingNow,
        ReminderKind::TwoHours,
        ReminderKind::Tomorrow,
    ];

    /// Inclusive [lo, hi] window in fractional minutes-to-start.
    pub fn window(self) -> (f64, f64) {
        match self {
            ReminderKind::StartingNow => (0.0, 2.0),
            ReminderKind::TwoHours => (119.0, 121.0),
            ReminderKind::Tomorrow => (1439.0, 1441.0),
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            ReminderKind::Tomorrow => "Upcoming meeting tomorrow",
            ReminderKind::TwoHours => "Meeting in 2 hours",
            ReminderKind::StartingNow => "Meeting starting now",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub title: String,
    pub start_time: DateTime<Utc>,
}

/// Compute the reminders one poll tick should emit. The windows are
/// disjoint, so a meeting matches at most one kind per tick.
pub fn due_reminders(meetings: &[Meeting], now: DateTime<Utc>) -> Vec<Reminder> {
    let mut due = Vec::new();
    for meeting in meetings {
        let minutes = meeting.minutes_to_start(now);
        for kind in ReminderKind::ALL {
            let (lo, hi) = kind.window();
            if minutes >= lo && minutes <= hi {
                due.push(Reminder {
                    kind,
                    title: meeting.title.clone(),
                    start_time: meeting.start_time,
                });
            }
        }
    }
    due
}

/// The running half of the scheduler's idle/running state machine.
///
/// `start` moves idle→running (worker thread spawned, immediate first
/// tick); `stop` moves running→idle (flag cleared, thread joined).
pub struct MeetingWatcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MeetingWatcher {
    pub fn start(client: ApiClient, interval: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::spawn(move || {
            let notifier = Notifier::new();
            // first tick immediately on entering running
            while flag.load(Ordering::SeqCst) {
                tick(&client, &notifier, &flag);
                nap(&flag, interval);
            }
            log::info!("meeting watcher stopped");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MeetingWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick(client: &ApiClient, notifier: &Notifier, running: &AtomicBool) {
    match client.list_meetings() {
        Ok(meetings) => {
            for reminder in due_reminders(&meetings, Utc::now()) {
                notifier.notify_reminder(&reminder);
            }
        }
        Err(ApiError::Unauthorized) => {
            // A dead token cannot recover without user action: clear the
            // session like logout and stop ticking.
            log::error!("meeting poll rejected: session expired");
            session::clear_stored_token_quietly();
            notifier.notify_session_expired();
            running.store(false, Ordering::SeqCst);
        }
        Err(e) => {
            // logged and swallowed; the scheduler keeps ticking
            log::warn!("meeting poll failed: {e}");
        }
    }
}

/// Sleep for `interval`, waking every STOP_POLL_MS to honor stop().
fn nap(running: &AtomicBool, interval: Duration) {
    let mut remaining = interval;
    while running.load(Ordering::SeqCst) && !remaining.is_zero() {
        let slice = remaining.min(Duration::from_millis(STOP_POLL_MS));
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

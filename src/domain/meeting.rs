use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MeetingId = i64;

/// One calendar entry as served by `/api/meetings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    #[serde(with = "crate::domain::timefmt")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "crate::domain::timefmt")]
    pub end_time: DateTime<Utc>,
    /// Comma separated list of participants.
    pub participants: String,
    /// "scheduled" or "cancelled".
    pub status: String,
}

impl Meeting {
    /// Upcoming means it has not ended yet. There is no persisted flag;
    /// the partition is recomputed against the clock at render time.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end_time >= now
    }

    /// Fractional minutes until the meeting starts (negative once started).
    pub fn minutes_to_start(&self, now: DateTime<Utc>) -> f64 {
        (self.start_time - now).num_milliseconds() as f64 / 60_000.0
    }
}

/// Split into (upcoming, past), preserving input order within each group.
pub fn split_upcoming_past(
    meetings: &[Meeting],
    now: DateTime<Utc>,
) -> (Vec<&Meeting>, Vec<&Meeting>) {
    meetings.iter().partition(|m| m.is_upcoming(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meeting_at(id: MeetingId, start: DateTime<Utc>, end: DateTime<Utc>) -> Meeting {
        Meeting {
            id,
            title: format!("meeting-{id}"),
            start_time: start,
            end_time: end,
            participants: "alice@example.com, bob@example.com".to_string(),
            status: "scheduled".to_string(),
        }
    }

    #[test]
    fn partition_uses_end_time() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let ongoing = meeting_at(1, now - chrono::Duration::minutes(30), now);
        let done = meeting_at(
            2,
            now - chrono::Duration::hours(2),
            now - chrono::Duration::hours(1),
        );
        let later = meeting_at(
            3,
            now + chrono::Duration::hours(1),
            now + chrono::Duration::hours(2),
        );

        let all = vec![ongoing.clone(), done.clone(), later.clone()];
        let (upcoming, past) = split_upcoming_past(&all, now);

        // end_time == now still counts as upcoming
        assert_eq!(
            upcoming.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(past.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn minutes_to_start_is_fractional() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let m = meeting_at(
            1,
            now + chrono::Duration::seconds(90),
            now + chrono::Duration::hours(1),
        );
        assert!((m.minutes_to_start(now) - 1.5).abs() < f64::EPSILON);
    }
}

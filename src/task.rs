//! Scheduled pointing/capture task.
//!
//! A [`Task`] is pure data: where to point, when to trigger, how long to
//! capture. Its ordering key is the scheduled instant; the delay it
//! reports is shifted earlier by the motor settling delay so the mount
//! can finish moving before the trigger moment arrives.

use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, SystemTime};

/// One scheduled pointing + capture operation.
///
/// Equality and ordering compare the scheduled instant only — the queue
/// key. Two tasks at the same instant are equal for ordering purposes and
/// run in arbitrary order.
#[derive(Debug, Clone)]
pub struct Task {
    /// Optional operator-facing label.
    pub title: Option<String>,
    /// Target azimuth in degrees. Range validation is the caller's.
    pub azimuth_deg: f64,
    /// Target elevation in degrees.
    pub elevation_deg: f64,
    /// Wall-clock trigger instant.
    pub scheduled_at: SystemTime,
    /// How long the capture collaborator should record.
    pub capture_duration: Duration,
}

impl Task {
    pub fn new(
        title: Option<String>,
        azimuth_deg: f64,
        elevation_deg: f64,
        scheduled_at: SystemTime,
        capture_duration: Duration,
    ) -> Self {
        Self {
            title,
            azimuth_deg,
            elevation_deg,
            scheduled_at,
            capture_duration,
        }
    }

    /// Label for logs and events.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    /// Milliseconds until this task becomes due:
    /// `scheduled_at - settling - now`. Negative values mean the task is
    /// already due (or overdue).
    pub fn delay_ms(&self, now: SystemTime, settling: Duration) -> i64 {
        let due_at = self.scheduled_at - settling;
        match due_at.duration_since(now) {
            Ok(remaining) => remaining.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }

    /// Milliseconds between `now` and the scheduled instant (no settling
    /// shift). Negative when the instant has already passed.
    pub fn lead_ms(&self, now: SystemTime) -> i64 {
        match self.scheduled_at.duration_since(now) {
            Ok(lead) => lead.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.scheduled_at == other.scheduled_at
    }
}

impl Eq for Task {}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scheduled_at.cmp(&other.scheduled_at)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' az={:.2}° el={:.2}° capture={}s",
            self.label(),
            self.azimuth_deg,
            self.elevation_deg,
            self.capture_duration.as_secs()
        )
    }
}

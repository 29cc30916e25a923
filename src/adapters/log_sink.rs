//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade. A future dashboard or MQTT adapter would implement
//! the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ConnectionEstablished => {
                info!("LINK  | connection established");
            }
            AppEvent::TaskScheduled {
                title,
                scheduled_at,
            } => {
                info!("TASK  | '{title}' scheduled for {scheduled_at:?}");
            }
            AppEvent::TaskExecuting {
                title,
                azimuth_deg,
                elevation_deg,
            } => {
                info!("TASK  | '{title}' executing: az={azimuth_deg:.2}° el={elevation_deg:.2}°");
            }
            AppEvent::TaskCompleted { title } => {
                info!("TASK  | '{title}' capture handed off");
            }
            AppEvent::TaskFailed { title, reason } => {
                warn!("TASK  | '{title}' failed: {reason}");
            }
            AppEvent::SchedulerStopped { reason } => {
                warn!("SCHED | worker stopped: {reason}");
            }
        }
    }
}

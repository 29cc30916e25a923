//! Outbound application events.
//!
//! The scheduler worker and [`RigService`](super::service::RigService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them — log them,
//! push them to a dashboard, etc.

use std::time::SystemTime;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The handshake with the io-controller completed.
    ConnectionEstablished,

    /// A task passed admission and entered the queue.
    TaskScheduled {
        title: String,
        scheduled_at: SystemTime,
    },

    /// The worker popped a due task and is driving the mount.
    TaskExecuting {
        title: String,
        azimuth_deg: f64,
        elevation_deg: f64,
    },

    /// Pointing confirmed and the trigger instant reached; capture was
    /// handed off.
    TaskCompleted { title: String },

    /// The task failed (pointing unconfirmed, or confirmed too late).
    /// Failure is isolated to the task; the worker continues.
    TaskFailed { title: String, reason: String },

    /// The worker stopped and will schedule nothing further.
    SchedulerStopped { reason: String },
}

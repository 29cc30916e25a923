//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RigService / Scheduler (domain)
//! ```
//!
//! Driven adapters (capture processes, log sinks, config storage)
//! implement these traits. The domain consumes them as trait objects
//! injected at startup, so the core never touches a camera binary or the
//! filesystem directly.

use crate::config::SystemConfig;
use crate::task::Task;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Capture port (domain → external capture subsystem)
// ───────────────────────────────────────────────────────────────

/// Capture-ready notification at a task's trigger instant.
///
/// Implementations must return promptly — the scheduler worker does not
/// wait for capture completion, and a slow `begin_capture` delays every
/// task behind this one.
pub trait CapturePort: Send {
    /// Pointing is confirmed and the scheduled instant has arrived.
    fn begin_capture(&mut self, task: &Task);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink: Send {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting: reject invalid
/// values with [`ConfigError::ValidationFailed`] rather than silently
/// clamping them.
pub trait ConfigPort {
    /// Load configuration from storage.
    /// Returns [`SystemConfig::default()`] if none is stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation; the `&'static str` names
    /// which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    Io(std::io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

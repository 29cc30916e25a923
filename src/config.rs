//! System configuration parameters.
//!
//! All tunable parameters for the rig controller. Defaults match the
//! deployed hardware (9600-baud io-controller link, ~5 s worst-case mount
//! slew); a JSON config file can override any of them.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::protocol::channel::LinkConfig;
use crate::task::Task;

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Serial link ---
    /// Serial device the io-controller is attached to.
    pub serial_port: String,
    /// Link baud rate (8 data bits, 1 stop bit, no parity).
    pub baud_rate: u32,
    /// Blocking-read timeout for one frame byte (milliseconds).
    pub receive_timeout_ms: u64,
    /// Attempts per command exchange before giving up.
    pub max_attempts: u32,
    /// Pause between exchange attempts (milliseconds).
    pub retry_delay_ms: u64,
    /// Wait after opening the port for the device to finish booting
    /// (milliseconds).
    pub device_boot_delay_ms: u64,

    // --- Scheduling ---
    /// Time reserved between issuing a pointing command and the moment
    /// pointing must be complete (milliseconds). Must cover the slowest
    /// slew the mount can make.
    pub motor_settling_ms: u64,

    // --- Telemetry ---
    /// Interval between environment/GPS polls in the main loop (seconds).
    pub telemetry_interval_secs: u64,

    // --- Capture ---
    /// External capture command, argv-style. `{title}` and
    /// `{duration_secs}` are substituted per task. Empty = log only.
    pub capture_command: Vec<String>,

    /// Tasks to schedule at startup.
    pub tasks: Vec<TaskSpec>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Serial link
            serial_port: "/dev/ttyS80".to_string(),
            baud_rate: 9600,
            receive_timeout_ms: 2000,
            max_attempts: 5,
            retry_delay_ms: 2000,
            device_boot_delay_ms: 2000,

            // Scheduling
            motor_settling_ms: 5000,

            // Telemetry
            telemetry_interval_secs: 60,

            // Capture
            capture_command: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

impl SystemConfig {
    /// Link tuning derived from the config.
    pub fn link(&self) -> LinkConfig {
        LinkConfig {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            boot_delay: Duration::from_millis(self.device_boot_delay_ms),
        }
    }

    /// Motor settling delay as a [`Duration`].
    pub fn motor_settling(&self) -> Duration {
        Duration::from_millis(self.motor_settling_ms)
    }

    /// Reject configurations the rig cannot run with.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.serial_port.is_empty() {
            return Err("serial_port must not be empty");
        }
        if self.baud_rate == 0 {
            return Err("baud_rate must be positive");
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1");
        }
        if self.motor_settling_ms == 0 {
            return Err("motor_settling_ms must be positive");
        }
        if self.receive_timeout_ms == 0 {
            return Err("receive_timeout_ms must be positive");
        }
        Ok(())
    }
}

/// A startup task as written in the config file. Instants are relative
/// (seconds from daemon start) so a config file stays reusable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    /// Trigger this many seconds after startup.
    pub start_in_secs: u64,
    /// Capture duration in seconds.
    pub duration_secs: u64,
}

impl TaskSpec {
    /// Materialise the spec against a concrete start time.
    pub fn to_task(&self, now: SystemTime) -> Task {
        Task::new(
            Some(self.title.clone()),
            self.azimuth_deg,
            self.elevation_deg,
            now + Duration::from_secs(self.start_in_secs),
            Duration::from_secs(self.duration_secs),
        )
    }
}

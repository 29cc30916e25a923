//! External-process capture adapter.
//!
//! The rig's imaging chain lives outside this daemon (an ffmpeg or
//! GStreamer pipeline on the same host). This adapter implements
//! [`CapturePort`] by spawning a configured command at the trigger
//! instant and returning immediately — the scheduler never waits for
//! capture to finish.

use std::process::Command;

use log::{info, warn};

use crate::app::ports::CapturePort;
use crate::task::Task;

/// Spawns an external capture command per task.
///
/// The command is argv-style; `{title}` and `{duration_secs}` are
/// substituted in every argument. With an empty command the trigger is
/// logged only, which is what bench setups without a camera want.
pub struct ProcessCapture {
    command: Vec<String>,
}

impl ProcessCapture {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn substituted(&self, task: &Task) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| {
                arg.replace("{title}", task.label())
                    .replace("{duration_secs}", &task.capture_duration.as_secs().to_string())
            })
            .collect()
    }
}

impl CapturePort for ProcessCapture {
    fn begin_capture(&mut self, task: &Task) {
        if self.command.is_empty() {
            info!("CAPTURE | '{}' ready (no capture command configured)", task.label());
            return;
        }

        let argv = self.substituted(task);
        // Fire and forget: the child is never waited on; init reaps it.
        match Command::new(&argv[0]).args(&argv[1..]).spawn() {
            Ok(child) => info!(
                "CAPTURE | '{}' started, pid {} ({}s)",
                task.label(),
                child.id(),
                task.capture_duration.as_secs()
            ),
            Err(e) => warn!("CAPTURE | '{}' spawn failed: {e}", task.label()),
        }
    }
}

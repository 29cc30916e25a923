//! SatTrak controller daemon — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialLink      ProcessCapture    LogEventSink  JsonConfigFile│
//! │  (Transport)     (CapturePort)     (EventSink)   (ConfigPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        RigService (channel + scheduler)                │    │
//! │  │  Channel: framed exchange, bounded retry               │    │
//! │  │  Scheduler: delay queue, worker thread                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The main thread doubles as an ad-hoc channel user: it polls the
//! environment and GPS on the telemetry interval, exercising the same
//! channel mutex the scheduler worker uses, and watches scheduler health
//! so a dead worker takes the process down visibly.

use std::time::{Duration, SystemTime};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use sattrak::adapters::capture::ProcessCapture;
use sattrak::adapters::config_file::JsonConfigFile;
use sattrak::adapters::log_sink::LogEventSink;
use sattrak::adapters::serial::SerialLink;
use sattrak::app::events::AppEvent;
use sattrak::app::ports::{ConfigPort, EventSink};
use sattrak::app::service::RigService;
use sattrak::config::SystemConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("SatTrak controller v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sattrak.json".to_string());
    let config: SystemConfig = JsonConfigFile::new(&config_path)
        .load()
        .with_context(|| format!("loading config from {config_path}"))?;

    // ── 2. Serial link + handshake ────────────────────────────
    let link = SerialLink::open(
        &config.serial_port,
        config.baud_rate,
        Duration::from_millis(config.receive_timeout_ms),
    )
    .with_context(|| format!("opening {}", config.serial_port))?;

    let mut rig = RigService::new(Box::new(link), &config);
    let mut sink = LogEventSink::new();

    rig.connect().context("establishing connection")?;
    sink.emit(&AppEvent::ConnectionEstablished);

    // ── 3. Scheduler + startup tasks ──────────────────────────
    rig.start(
        Box::new(ProcessCapture::new(config.capture_command.clone())),
        Box::new(LogEventSink::new()),
    );

    let now = SystemTime::now();
    for spec in &config.tasks {
        let task = spec.to_task(now);
        let scheduled_at = task.scheduled_at;
        match rig.schedule(task) {
            Ok(()) => sink.emit(&AppEvent::TaskScheduled {
                title: spec.title.clone(),
                scheduled_at,
            }),
            Err(e) => warn!("startup task '{}' rejected: {e}", spec.title),
        }
    }

    // ── 4. Telemetry + health loop ────────────────────────────
    let interval = Duration::from_secs(config.telemetry_interval_secs.max(1));
    loop {
        std::thread::sleep(interval);

        if let Some(fatal) = rig.scheduler().fatal_error() {
            bail!("scheduler worker died: {fatal}");
        }

        match rig.environment() {
            Ok(env) => info!(
                "ENV   | temperature={}°C humidity={}%",
                env.temperature_c, env.humidity_pct
            ),
            Err(e) => warn!("ENV   | read failed: {e}"),
        }

        match rig.gps() {
            Ok(fix) => info!(
                "GPS   | lat={:.5}° lon={:.5}°",
                fix.latitude_deg, fix.longitude_deg
            ),
            Err(e) => warn!("GPS   | read failed: {e}"),
        }
    }
}

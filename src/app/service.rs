//! Rig service — the hexagonal core.
//!
//! [`RigService`] owns the one serial [`Channel`] (created at startup,
//! closed at shutdown — no global singleton) and the [`Scheduler`].
//! The channel is a single half-duplex resource shared between the
//! scheduler worker and ad-hoc callers, so every conversation serialises
//! behind one mutex; interleaved frames would corrupt both conversations.
//!
//! ```text
//!            ┌──────────────────────────────┐
//!  schedule ─▶│          RigService          │─▶ CapturePort
//!  ad-hoc   ─▶│  Scheduler · Arc<Mutex<Channel>> │─▶ EventSink
//!            └──────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SystemConfig;
use crate::error::{Error, ProtocolError, SchedulerError};
use crate::protocol::channel::Channel;
use crate::protocol::command::Command;
use crate::protocol::packet::{
    AnyPacket, ReadEnvPacket, ReadGpsPacket, ReadOrientationPacket, SetOrientationPacket,
};
use crate::protocol::transport::Transport;
use crate::scheduler::Scheduler;
use crate::task::Task;

use super::ports::{CapturePort, EventSink};

// ───────────────────────────────────────────────────────────────
// Readout types
// ───────────────────────────────────────────────────────────────

/// Current mount pointing, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

/// Enclosure environmental readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub temperature_c: i16,
    pub humidity_pct: i16,
}

/// Rig GPS fix, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

// ───────────────────────────────────────────────────────────────
// RigService
// ───────────────────────────────────────────────────────────────

/// Owns the serial channel and the task scheduler.
pub struct RigService {
    channel: Arc<Mutex<Channel>>,
    scheduler: Scheduler,
}

impl RigService {
    /// Build the service over an opened transport. No handshake happens
    /// yet — call [`connect`](Self::connect) next.
    pub fn new(transport: Box<dyn Transport>, config: &SystemConfig) -> Self {
        let channel = Arc::new(Mutex::new(Channel::new(transport, config.link())));
        let scheduler = Scheduler::new(config.motor_settling());
        Self { channel, scheduler }
    }

    /// Perform the connection handshake with the io-controller.
    pub fn connect(&self) -> Result<(), Error> {
        self.lock_channel()?.establish_connection()?;
        Ok(())
    }

    /// Start the scheduler worker with the given collaborators.
    pub fn start(&mut self, capture: Box<dyn CapturePort>, sink: Box<dyn EventSink>) {
        self.scheduler
            .start(Arc::clone(&self.channel), capture, sink);
    }

    /// Admit a task for execution at its scheduled instant.
    pub fn schedule(&self, task: Task) -> Result<(), Error> {
        self.scheduler.schedule(task)
    }

    /// Scheduler health and queue introspection.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Stop the scheduler worker and drop queued tasks.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }

    // ── Ad-hoc commands ───────────────────────────────────────
    //
    // These share the channel with the worker; each call holds the lock
    // for exactly one exchange.

    /// Point the mount now, outside any schedule.
    pub fn set_orientation(&self, azimuth_deg: f64, elevation_deg: f64) -> Result<(), Error> {
        let reply = self.lock_channel()?.send_and_receive(&SetOrientationPacket {
            azimuth_deg,
            elevation_deg,
        })?;
        match reply {
            AnyPacket::Ack(_) => Ok(()),
            other => Err(unexpected(Command::Ack, &other)),
        }
    }

    /// Read the mount's current pointing.
    pub fn orientation(&self) -> Result<Orientation, Error> {
        let reply = self
            .lock_channel()?
            .send_and_receive(&ReadOrientationPacket)?;
        match reply {
            AnyPacket::OrientationResponse(p) => Ok(Orientation {
                azimuth_deg: p.azimuth_deg,
                elevation_deg: p.elevation_deg,
            }),
            other => Err(unexpected(Command::ResponseOrientation, &other)),
        }
    }

    /// Read the enclosure's environmental sensors.
    pub fn environment(&self) -> Result<Environment, Error> {
        let reply = self.lock_channel()?.send_and_receive(&ReadEnvPacket)?;
        match reply {
            AnyPacket::EnvResponse(p) => Ok(Environment {
                temperature_c: p.temperature_c,
                humidity_pct: p.humidity_pct,
            }),
            other => Err(unexpected(Command::ResponseEnv, &other)),
        }
    }

    /// Read the rig's GPS fix.
    pub fn gps(&self) -> Result<GpsFix, Error> {
        let reply = self.lock_channel()?.send_and_receive(&ReadGpsPacket)?;
        match reply {
            AnyPacket::GpsResponse(p) => Ok(GpsFix {
                latitude_deg: p.latitude_deg,
                longitude_deg: p.longitude_deg,
            }),
            other => Err(unexpected(Command::ResponseGps, &other)),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn lock_channel(&self) -> Result<MutexGuard<'_, Channel>, Error> {
        self.channel
            .lock()
            .map_err(|_| Error::Scheduler(SchedulerError::ChannelPoisoned))
    }
}

/// The channel guarantees reply variants match their opcodes, so these
/// arms are unreachable in practice; map them to a typed error anyway
/// rather than panic on a protocol regression.
fn unexpected(expected: Command, got: &AnyPacket) -> Error {
    Error::Protocol(ProtocolError::UnexpectedResponse {
        expected,
        got: got.command(),
    })
}

//! Unified error types for the SatTrak controller.
//!
//! A single top-level [`Error`] that every subsystem converts into, keeping
//! the daemon's error handling uniform. Protocol and scheduling failures
//! stay typed all the way up so callers can react per variant instead of
//! string-matching.

use std::fmt;
use std::io;

use crate::protocol::command::Command;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A serial-protocol exchange failed.
    Protocol(ProtocolError),
    /// A task could not be admitted or executed.
    Task(TaskError),
    /// The scheduler worker hit a fatal condition.
    Scheduler(SchedulerError),
    /// Generic I/O failure outside the transport (config files etc.).
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Task(e) => write!(f, "task: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Failures in the framed command/response exchange with the io-controller.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame's first byte was not the sentinel. Carries the bad byte.
    MalformedFrame(u8),
    /// Reserved: the frame's integrity check failed. The current wire
    /// format allocates no checksum bytes and validation always passes.
    ChecksumInvalid,
    /// Fewer bytes than one full frame were presented to the decoder.
    FrameTooShort(usize),
    /// A well-formed frame arrived carrying the wrong opcode.
    UnexpectedResponse { expected: Command, got: Command },
    /// An ACK arrived, but it acknowledged a different command than the
    /// one outstanding.
    MisdirectedAck { requested: Command, acked: Command },
    /// `send_and_receive` was called with a command that has no expected
    /// response; those are fire-and-forget.
    NoReplyExpected(Command),
    /// All attempts were exhausted without the expected response.
    NoResponse { expected: Command, last_seen: Command },
    /// The transport collaborator reported an I/O failure.
    Transport(TransportError),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFrame(byte) => {
                write!(f, "malformed frame: header byte 0x{byte:02X}")
            }
            Self::ChecksumInvalid => write!(f, "frame checksum invalid"),
            Self::FrameTooShort(len) => write!(f, "frame too short: {len} bytes"),
            Self::UnexpectedResponse { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            Self::MisdirectedAck { requested, acked } => {
                write!(f, "ACK names {acked}, outstanding request was {requested}")
            }
            Self::NoReplyExpected(cmd) => {
                write!(f, "{cmd} expects no response")
            }
            Self::NoResponse { expected, last_seen } => {
                write!(f, "no response: expected {expected}, last seen {last_seen}")
            }
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<TransportError> for ProtocolError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// I/O failures reported by the byte-transport collaborator.
#[derive(Debug)]
pub enum TransportError {
    /// Underlying I/O error (includes read timeouts).
    Io(io::Error),
    /// The transport has no more data and will never produce any
    /// (port closed, or a scripted test transport ran dry).
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Closed => write!(f, "transport closed"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Task errors
// ---------------------------------------------------------------------------

/// Per-task failures. A failed task never takes the scheduler down with it.
#[derive(Debug)]
pub enum TaskError {
    /// The task's scheduled instant leaves less lead time than the motor
    /// settling delay; pointing could not complete before the trigger.
    NotSchedulable { required_ms: u64, available_ms: i64 },
    /// The mount never confirmed the pointing command.
    OrientationFailed(ProtocolError),
    /// Pointing was confirmed only after the scheduled instant had passed.
    DeadlineMissed { late_ms: u64 },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSchedulable {
                required_ms,
                available_ms,
            } => write!(
                f,
                "not schedulable: {available_ms}ms lead, {required_ms}ms required"
            ),
            Self::OrientationFailed(e) => write!(f, "orientation not confirmed: {e}"),
            Self::DeadlineMissed { late_ms } => {
                write!(f, "orientation not set in time ({late_ms}ms late)")
            }
        }
    }
}

impl std::error::Error for TaskError {}

impl From<TaskError> for Error {
    fn from(e: TaskError) -> Self {
        Self::Task(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler fatal errors
// ---------------------------------------------------------------------------

/// Conditions that terminate the scheduler worker. Surfaced to the owning
/// process through `Scheduler::fatal_error`, never swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The task queue lock was poisoned by a panicking thread.
    QueuePoisoned,
    /// The shared channel lock was poisoned; the serial conversation
    /// state is unknown and no further commands can be issued safely.
    ChannelPoisoned,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueuePoisoned => write!(f, "task queue lock poisoned"),
            Self::ChannelPoisoned => write!(f, "channel lock poisoned"),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

/// Controller-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;

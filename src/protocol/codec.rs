//! Frame codec — fixed-length wire frames and the opcode decoder registry.
//!
//! Wire format (bit-exact, shared with the io-controller firmware):
//!
//! ```text
//! ┌──────────┬──────────┬───────────────────────────────┐
//! │ Sentinel │  Opcode  │  Argument region (zero-padded)│
//! │  0xAA    │  1 byte  │  22 bytes                     │
//! └──────────┴──────────┴───────────────────────────────┘
//! ```
//!
//! The trailing region is reserved for a future integrity checksum; the
//! deployed firmware allocates no checksum bytes and validates none, so
//! [`checksum_valid`] is a fixed pass and `ChecksumInvalid` stays reserved.

use std::collections::HashMap;

use crate::error::ProtocolError;

use super::command::Command;
use super::packet::{
    AckPacket, AnyPacket, EnvResponsePacket, EstablishConnectionPacket, GpsResponsePacket,
    NackPacket, OrientationResponsePacket, Packet, ReadEnvPacket, ReadGpsPacket,
    ReadOrientationPacket, SetOrientationPacket,
};

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 24;

/// Frame header constant; any other first byte is a malformed frame.
pub const SENTINEL: u8 = 0xAA;

/// Byte positions within a frame.
pub const LOC_SENTINEL: usize = 0;
pub const LOC_OPCODE: usize = 1;
pub const LOC_ARGS: usize = 2;

/// Length of the argument region.
pub const ARG_LEN: usize = FRAME_LEN - LOC_ARGS;

/// One wire frame.
pub type Frame = [u8; FRAME_LEN];

/// Encode a packet into its frame. The buffer is pre-zeroed, so packets
/// whose arguments are shorter than the region are zero-padded implicitly.
pub fn encode(packet: &dyn Packet) -> Frame {
    let mut frame: Frame = [0; FRAME_LEN];
    frame[LOC_SENTINEL] = SENTINEL;
    frame[LOC_OPCODE] = packet.command().opcode();

    let mut args = [0u8; ARG_LEN];
    packet.encode_args(&mut args);
    frame[LOC_ARGS..].copy_from_slice(&args);

    frame
}

/// Reserved integrity hook. The wire format allocates no checksum bytes
/// today; any scheme adopted later must keep this pass-through decodable.
fn checksum_valid(_frame: &Frame) -> bool {
    true
}

// ───────────────────────────────────────────────────────────────
// Decoder registry
// ───────────────────────────────────────────────────────────────

/// Decoder for one command's argument region.
pub type DecodeFn = fn(&[u8; ARG_LEN]) -> AnyPacket;

/// Opcode → decoder table, populated at construction.
///
/// Decode dispatch goes through this table rather than a hard-wired
/// switch, so a new command needs only a [`register`](Self::register)
/// call next to its packet type.
pub struct DecoderRegistry {
    decoders: HashMap<u8, DecodeFn>,
}

impl DecoderRegistry {
    /// An empty registry. Most callers want [`DecoderRegistry::default`].
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register (or replace) the decoder for a command.
    pub fn register(&mut self, command: Command, decode: DecodeFn) {
        self.decoders.insert(command.opcode(), decode);
    }

    /// Decode one frame into a typed packet.
    ///
    /// Frames longer than [`FRAME_LEN`] are decoded from their first
    /// [`FRAME_LEN`] bytes. Unknown or unregistered opcodes decode to
    /// [`AnyPacket::Null`] — tolerated, so that line garbage surfaces as
    /// a response mismatch upstream instead of a hard decode error.
    pub fn decode(&self, bytes: &[u8]) -> Result<AnyPacket, ProtocolError> {
        if bytes.len() < FRAME_LEN {
            return Err(ProtocolError::FrameTooShort(bytes.len()));
        }
        if bytes[LOC_SENTINEL] != SENTINEL {
            return Err(ProtocolError::MalformedFrame(bytes[LOC_SENTINEL]));
        }

        let mut frame: Frame = [0; FRAME_LEN];
        frame.copy_from_slice(&bytes[..FRAME_LEN]);
        if !checksum_valid(&frame) {
            return Err(ProtocolError::ChecksumInvalid);
        }

        let mut args = [0u8; ARG_LEN];
        args.copy_from_slice(&frame[LOC_ARGS..]);

        match self.decoders.get(&frame[LOC_OPCODE]) {
            Some(decode) => Ok(decode(&args)),
            None => Ok(AnyPacket::Null),
        }
    }
}

impl Default for DecoderRegistry {
    /// Registry pre-populated with every command the link speaks.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Command::Ack, |args| AnyPacket::Ack(AckPacket::from_args(args)));
        registry.register(Command::Nack, |args| {
            AnyPacket::Nack(NackPacket::from_args(args))
        });
        registry.register(Command::SetOrientation, |args| {
            AnyPacket::SetOrientation(SetOrientationPacket::from_args(args))
        });
        registry.register(Command::ReadOrientation, |_| {
            AnyPacket::ReadOrientation(ReadOrientationPacket)
        });
        registry.register(Command::ResponseOrientation, |args| {
            AnyPacket::OrientationResponse(OrientationResponsePacket::from_args(args))
        });
        registry.register(Command::ReadEnv, |_| AnyPacket::ReadEnv(ReadEnvPacket));
        registry.register(Command::ResponseEnv, |args| {
            AnyPacket::EnvResponse(EnvResponsePacket::from_args(args))
        });
        registry.register(Command::ReadGps, |_| AnyPacket::ReadGps(ReadGpsPacket));
        registry.register(Command::ResponseGps, |args| {
            AnyPacket::GpsResponse(GpsResponsePacket::from_args(args))
        });
        registry.register(Command::EstablishConnection, |_| {
            AnyPacket::EstablishConnection(EstablishConnectionPacket)
        });
        registry
    }
}

// ───────────────────────────────────────────────────────────────
// Argument field helpers
// ───────────────────────────────────────────────────────────────

/// Write a big-endian f64 at `at` within the argument region.
pub(crate) fn put_f64(args: &mut [u8], at: usize, value: f64) {
    args[at..at + 8].copy_from_slice(&value.to_be_bytes());
}

/// Read a big-endian f64 at `at` within the argument region.
pub(crate) fn get_f64(args: &[u8], at: usize) -> f64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&args[at..at + 8]);
    f64::from_be_bytes(raw)
}

/// Write a big-endian i16 at `at` within the argument region.
pub(crate) fn put_i16(args: &mut [u8], at: usize, value: i16) {
    args[at..at + 2].copy_from_slice(&value.to_be_bytes());
}

/// Read a big-endian i16 at `at` within the argument region.
pub(crate) fn get_i16(args: &[u8], at: usize) -> i16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&args[at..at + 2]);
    i16::from_be_bytes(raw)
}

//! Typed packets for the io-controller link.
//!
//! Each concrete packet fixes its argument layout at compile-time offsets
//! within the frame's 22-byte argument region. Numeric fields use raw
//! big-endian encodings (IEEE-754 f64 for angles and coordinates, i16 for
//! environmental readings); the firmware shares these layouts.
//!
//! | Packet                     | Arguments (offset: field)                |
//! |----------------------------|------------------------------------------|
//! | ACK / NACK                 | 0: opcode of the (n)ack'd command        |
//! | SET_ORIENTATION            | 0: azimuth f64, 8: elevation f64         |
//! | RESPONSE_ORIENTATION       | 0: azimuth f64, 8: elevation f64         |
//! | RESPONSE_ENV               | 0: temperature i16, 2: humidity i16      |
//! | RESPONSE_GPS               | 0: latitude f64, 8: longitude f64        |
//! | READ_* / ESTABLISH_CONN    | none                                     |

use super::codec::{get_f64, get_i16, put_f64, put_i16, ARG_LEN};
use super::command::Command;

/// A typed view of one outgoing or incoming frame.
///
/// `encode_args` writes into a pre-zeroed argument region, so packets with
/// fewer arguments than the region holds are zero-padded implicitly.
pub trait Packet {
    /// The command this packet carries.
    fn command(&self) -> Command;

    /// Write the argument fields at their fixed offsets.
    fn encode_args(&self, args: &mut [u8; ARG_LEN]);
}

/// A decoded packet, tagged by the command actually received.
///
/// A successful decode always yields the variant matching the frame's
/// opcode; unknown opcodes yield [`AnyPacket::Null`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyPacket {
    Null,
    Ack(AckPacket),
    Nack(NackPacket),
    SetOrientation(SetOrientationPacket),
    ReadOrientation(ReadOrientationPacket),
    OrientationResponse(OrientationResponsePacket),
    ReadEnv(ReadEnvPacket),
    EnvResponse(EnvResponsePacket),
    ReadGps(ReadGpsPacket),
    GpsResponse(GpsResponsePacket),
    EstablishConnection(EstablishConnectionPacket),
}

impl AnyPacket {
    /// The command of the decoded packet.
    pub fn command(&self) -> Command {
        match self {
            Self::Null => Command::Null,
            Self::Ack(_) => Command::Ack,
            Self::Nack(_) => Command::Nack,
            Self::SetOrientation(_) => Command::SetOrientation,
            Self::ReadOrientation(_) => Command::ReadOrientation,
            Self::OrientationResponse(_) => Command::ResponseOrientation,
            Self::ReadEnv(_) => Command::ReadEnv,
            Self::EnvResponse(_) => Command::ResponseEnv,
            Self::ReadGps(_) => Command::ReadGps,
            Self::GpsResponse(_) => Command::ResponseGps,
            Self::EstablishConnection(_) => Command::EstablishConnection,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ACK / NACK
// ───────────────────────────────────────────────────────────────

const LOC_ACKD_COMMAND: usize = 0;

/// ACK — the device accepted a command. The argument names which one,
/// letting the sender verify the *right* command was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckPacket {
    pub acked: Command,
}

impl Packet for AckPacket {
    fn command(&self) -> Command {
        Command::Ack
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        args[LOC_ACKD_COMMAND] = self.acked.opcode();
    }
}

impl AckPacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            acked: Command::from_opcode(args[LOC_ACKD_COMMAND]),
        }
    }
}

/// NACK — the device rejected a command; the argument names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NackPacket {
    pub nacked: Command,
}

impl Packet for NackPacket {
    fn command(&self) -> Command {
        Command::Nack
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        args[LOC_ACKD_COMMAND] = self.nacked.opcode();
    }
}

impl NackPacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            nacked: Command::from_opcode(args[LOC_ACKD_COMMAND]),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Orientation
// ───────────────────────────────────────────────────────────────

const LOC_AZIMUTH: usize = 0;
const LOC_ELEVATION: usize = 8;

/// SET_ORIENTATION — drive the mount to the given pointing angles.
/// Angles are degrees; range validation is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetOrientationPacket {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl Packet for SetOrientationPacket {
    fn command(&self) -> Command {
        Command::SetOrientation
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        put_f64(args, LOC_AZIMUTH, self.azimuth_deg);
        put_f64(args, LOC_ELEVATION, self.elevation_deg);
    }
}

impl SetOrientationPacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            azimuth_deg: get_f64(args, LOC_AZIMUTH),
            elevation_deg: get_f64(args, LOC_ELEVATION),
        }
    }
}

/// READ_ORIENTATION — ask the mount for its current pointing. No arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOrientationPacket;

impl Packet for ReadOrientationPacket {
    fn command(&self) -> Command {
        Command::ReadOrientation
    }

    fn encode_args(&self, _args: &mut [u8; ARG_LEN]) {}
}

/// RESPONSE_ORIENTATION — the mount's reported pointing, same layout as
/// [`SetOrientationPacket`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationResponsePacket {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl Packet for OrientationResponsePacket {
    fn command(&self) -> Command {
        Command::ResponseOrientation
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        put_f64(args, LOC_AZIMUTH, self.azimuth_deg);
        put_f64(args, LOC_ELEVATION, self.elevation_deg);
    }
}

impl OrientationResponsePacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            azimuth_deg: get_f64(args, LOC_AZIMUTH),
            elevation_deg: get_f64(args, LOC_ELEVATION),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Environment
// ───────────────────────────────────────────────────────────────

const LOC_TEMPERATURE: usize = 0;
const LOC_HUMIDITY: usize = 2;

/// READ_ENV — ask for the enclosure's environmental readings. No arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadEnvPacket;

impl Packet for ReadEnvPacket {
    fn command(&self) -> Command {
        Command::ReadEnv
    }

    fn encode_args(&self, _args: &mut [u8; ARG_LEN]) {}
}

/// RESPONSE_ENV — temperature in whole °C and relative humidity in whole
/// percent, both signed 16-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvResponsePacket {
    pub temperature_c: i16,
    pub humidity_pct: i16,
}

impl Packet for EnvResponsePacket {
    fn command(&self) -> Command {
        Command::ResponseEnv
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        put_i16(args, LOC_TEMPERATURE, self.temperature_c);
        put_i16(args, LOC_HUMIDITY, self.humidity_pct);
    }
}

impl EnvResponsePacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            temperature_c: get_i16(args, LOC_TEMPERATURE),
            humidity_pct: get_i16(args, LOC_HUMIDITY),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// GPS
// ───────────────────────────────────────────────────────────────

const LOC_LATITUDE: usize = 0;
const LOC_LONGITUDE: usize = 8;

/// READ_GPS — ask for the rig's GPS fix. No arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadGpsPacket;

impl Packet for ReadGpsPacket {
    fn command(&self) -> Command {
        Command::ReadGps
    }

    fn encode_args(&self, _args: &mut [u8; ARG_LEN]) {}
}

/// RESPONSE_GPS — latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsResponsePacket {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Packet for GpsResponsePacket {
    fn command(&self) -> Command {
        Command::ResponseGps
    }

    fn encode_args(&self, args: &mut [u8; ARG_LEN]) {
        put_f64(args, LOC_LATITUDE, self.latitude_deg);
        put_f64(args, LOC_LONGITUDE, self.longitude_deg);
    }
}

impl GpsResponsePacket {
    pub fn from_args(args: &[u8; ARG_LEN]) -> Self {
        Self {
            latitude_deg: get_f64(args, LOC_LATITUDE),
            longitude_deg: get_f64(args, LOC_LONGITUDE),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Handshake
// ───────────────────────────────────────────────────────────────

/// ESTABLISH_CONNECTION — handshake probe sent after the device's boot
/// delay. Answered by ACK(ESTABLISH_CONNECTION). No arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EstablishConnectionPacket;

impl Packet for EstablishConnectionPacket {
    fn command(&self) -> Command {
        Command::EstablishConnection
    }

    fn encode_args(&self, _args: &mut [u8; ARG_LEN]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_args_are_bit_exact() {
        let packet = SetOrientationPacket {
            azimuth_deg: 175.0,
            elevation_deg: 45.0,
        };
        let mut args = [0u8; ARG_LEN];
        packet.encode_args(&mut args);

        assert_eq!(args[0..8], 175.0f64.to_be_bytes());
        assert_eq!(args[8..16], 45.0f64.to_be_bytes());
        assert!(args[16..].iter().all(|b| *b == 0), "trailing pad not zero");
    }

    #[test]
    fn env_args_are_bit_exact() {
        let packet = EnvResponsePacket {
            temperature_c: -12,
            humidity_pct: 87,
        };
        let mut args = [0u8; ARG_LEN];
        packet.encode_args(&mut args);

        assert_eq!(args[0..2], (-12i16).to_be_bytes());
        assert_eq!(args[2..4], 87i16.to_be_bytes());
    }

    #[test]
    fn ack_carries_the_acked_opcode() {
        let packet = AckPacket {
            acked: Command::SetOrientation,
        };
        let mut args = [0u8; ARG_LEN];
        packet.encode_args(&mut args);
        assert_eq!(args[0], Command::SetOrientation.opcode());

        let decoded = AckPacket::from_args(&args);
        assert_eq!(decoded.acked, Command::SetOrientation);
    }

    #[test]
    fn read_packets_have_no_args() {
        let mut args = [0u8; ARG_LEN];
        ReadOrientationPacket.encode_args(&mut args);
        ReadEnvPacket.encode_args(&mut args);
        ReadGpsPacket.encode_args(&mut args);
        EstablishConnectionPacket.encode_args(&mut args);
        assert_eq!(args, [0u8; ARG_LEN]);
    }
}

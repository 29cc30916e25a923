//! Command registry — the closed opcode set of the io-controller link.
//!
//! Each command maps to a one-byte opcode (fixed by the deployed firmware)
//! and to the response command it expects back, if any. ACK, NACK and the
//! RESPONSE_* commands are terminal: nothing is expected after them.

use std::fmt;

/// One-byte command identifiers exchanged in the frame's second byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Decoded stand-in for unknown or garbage opcodes.
    Null,
    Ack,
    Nack,
    SetOrientation,
    ReadOrientation,
    ResponseOrientation,
    ReadEnv,
    ResponseEnv,
    ReadGps,
    ResponseGps,
    EstablishConnection,
}

impl Command {
    /// Wire opcode for this command.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Null => 0x00,
            Self::Ack => 0x01,
            Self::Nack => 0x02,
            Self::SetOrientation => 0x03,
            Self::ReadOrientation => 0x04,
            Self::ResponseOrientation => 0x05,
            Self::ReadEnv => 0x06,
            Self::ResponseEnv => 0x07,
            Self::ReadGps => 0x08,
            Self::ResponseGps => 0x09,
            Self::EstablishConnection => 0x0A,
        }
    }

    /// Decode an opcode byte. Unknown values map to [`Command::Null`] so
    /// that garbage on the wire degrades to a retry, not a decode failure.
    pub fn from_opcode(raw: u8) -> Self {
        match raw {
            0x01 => Self::Ack,
            0x02 => Self::Nack,
            0x03 => Self::SetOrientation,
            0x04 => Self::ReadOrientation,
            0x05 => Self::ResponseOrientation,
            0x06 => Self::ReadEnv,
            0x07 => Self::ResponseEnv,
            0x08 => Self::ReadGps,
            0x09 => Self::ResponseGps,
            0x0A => Self::EstablishConnection,
            _ => Self::Null,
        }
    }

    /// The response command this command expects, or `None` for terminal
    /// commands. Commands answered by ACK additionally require the ACK to
    /// name them in its argument byte — "some ACK arrived" is not enough.
    pub const fn expected_response(self) -> Option<Command> {
        match self {
            Self::SetOrientation | Self::EstablishConnection => Some(Self::Ack),
            Self::ReadOrientation => Some(Self::ResponseOrientation),
            Self::ReadEnv => Some(Self::ResponseEnv),
            Self::ReadGps => Some(Self::ResponseGps),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::Ack => "ACK",
            Self::Nack => "NACK",
            Self::SetOrientation => "SET_ORIENTATION",
            Self::ReadOrientation => "READ_ORIENTATION",
            Self::ResponseOrientation => "RESPONSE_ORIENTATION",
            Self::ReadEnv => "READ_ENV",
            Self::ResponseEnv => "RESPONSE_ENV",
            Self::ReadGps => "READ_GPS",
            Self::ResponseGps => "RESPONSE_GPS",
            Self::EstablishConnection => "ESTABLISH_CONNECTION",
        };
        f.write_str(name)
    }
}

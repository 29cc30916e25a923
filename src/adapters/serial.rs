//! Serial transport adapter.
//!
//! Wraps a `serialport` handle in the [`Transport`] trait. The link to
//! the io-controller runs at 9600 baud, 8 data bits, 1 stop bit, no
//! parity; the read timeout bounds each blocking byte read so a silent
//! device surfaces as a transport error and the channel's retry logic
//! takes over.

use std::io::{Read, Write};
use std::time::Duration;

use log::info;
use serialport::{DataBits, Parity, SerialPort, StopBits};

use crate::error::TransportError;
use crate::protocol::transport::Transport;

/// Transport over a physical serial port.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open `path` with the link's fixed 8/N/1 framing.
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::Io(e.into()))?;

        info!("opened {path} at {baud_rate} baud (8N1, timeout {timeout:?})");
        Ok(Self { port })
    }
}

impl Transport for SerialLink {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn receive_byte(&mut self) -> Result<u8, TransportError> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let available = self
            .port
            .bytes_to_read()
            .map_err(|e| TransportError::Io(e.into()))?;
        Ok(available as usize)
    }
}

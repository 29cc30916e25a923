//! Transport abstraction — any byte-oriented, half-duplex link.
//!
//! Concrete implementations:
//! - serial port (9600 8N1 to the io-controller) — see
//!   [`SerialLink`](crate::adapters::serial::SerialLink)
//! - scripted in-memory links for tests
//!
//! The [`Channel`](super::channel::Channel) is written against this trait,
//! so swapping the physical link requires zero changes to the retry logic.

use crate::error::TransportError;

/// Byte-oriented transport collaborator.
///
/// `Send` because the scheduler worker drives the channel from its own
/// thread.
pub trait Transport: Send {
    /// Write all of `bytes` to the link.
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read one byte, blocking until it arrives or the transport's own
    /// read timeout elapses (surfaced as an error).
    fn receive_byte(&mut self) -> Result<u8, TransportError>;

    /// Number of bytes already buffered and readable without blocking.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;
}

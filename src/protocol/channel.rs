//! Channel — reliable one-shot command execution over an unreliable link.
//!
//! The link is strictly half-duplex: one request in flight, one fixed-size
//! response frame back. [`Channel::send_and_receive`] owns the whole
//! exchange — encode, send, blocking receive, decode, validate against the
//! command registry's expected response — and retries with a stale-buffer
//! flush between attempts until the bounded attempt count runs out.
//!
//! The channel itself is not thread-safe; callers on multiple threads must
//! share it behind one mutex so conversations cannot interleave. There is
//! no abort path for an exchange already in flight — an external deadline
//! must let the exchange drain before reusing the channel.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{ProtocolError, TransportError};

use super::codec::{self, DecoderRegistry, Frame, FRAME_LEN};
use super::command::Command;
use super::packet::{AnyPacket, EstablishConnectionPacket, Packet};
use super::transport::Transport;

/// Link-level tuning. Defaults match the deployed rig; tests shrink the
/// delays to keep runs fast.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Attempts per exchange before giving up.
    pub max_attempts: u32,
    /// Pause between attempts, giving the device time to recover.
    pub retry_delay: Duration,
    /// Wait after opening the port; the device reboots when the host
    /// asserts DTR and drops early bytes until its firmware is up.
    pub boot_delay: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_millis(2000),
            boot_delay: Duration::from_millis(2000),
        }
    }
}

/// One serial conversation endpoint.
pub struct Channel {
    transport: Box<dyn Transport>,
    registry: DecoderRegistry,
    link: LinkConfig,
}

impl Channel {
    /// Channel over `transport` with the default decoder set.
    pub fn new(transport: Box<dyn Transport>, link: LinkConfig) -> Self {
        Self {
            transport,
            registry: DecoderRegistry::default(),
            link,
        }
    }

    /// Channel with a caller-supplied decoder registry.
    pub fn with_registry(
        transport: Box<dyn Transport>,
        link: LinkConfig,
        registry: DecoderRegistry,
    ) -> Self {
        Self {
            transport,
            registry,
            link,
        }
    }

    /// Handshake with the device: wait out its boot delay, then exchange
    /// ESTABLISH_CONNECTION for ACK(ESTABLISH_CONNECTION). Retries are
    /// handled inside [`send_and_receive`](Self::send_and_receive);
    /// exhaustion propagates to the caller.
    pub fn establish_connection(&mut self) -> Result<(), ProtocolError> {
        info!(
            "establishing connection (boot delay {}ms)",
            self.link.boot_delay.as_millis()
        );
        thread::sleep(self.link.boot_delay);
        self.send_and_receive(&EstablishConnectionPacket)?;
        info!("connection established");
        Ok(())
    }

    /// Send `request` and block for its expected response.
    ///
    /// On success the returned packet's variant always matches the opcode
    /// actually received (ACK, NACK or a RESPONSE_*). On any per-attempt
    /// failure — opcode mismatch, ACK naming the wrong command, malformed
    /// frame, transport error — the read buffer is flushed, the retry
    /// delay elapses, and the exchange is attempted again. Exhausting
    /// `max_attempts` fails with `NoResponse` naming the expected and
    /// last-seen opcodes.
    pub fn send_and_receive(&mut self, request: &dyn Packet) -> Result<AnyPacket, ProtocolError> {
        let command = request.command();
        let Some(expected) = command.expected_response() else {
            return Err(ProtocolError::NoReplyExpected(command));
        };

        let frame = codec::encode(request);
        let mut last_seen = Command::Null;

        for attempt in 1..=self.link.max_attempts {
            if attempt > 1 {
                match self.flush_read_buffer() {
                    Ok(0) => {}
                    Ok(stale) => debug!("flushed {stale} stale bytes before retry"),
                    Err(e) => warn!("flush before retry failed: {e}"),
                }
                thread::sleep(self.link.retry_delay);
            }

            match self.attempt(&frame, command, expected, &mut last_seen) {
                Ok(reply) => return Ok(reply),
                Err(e) => warn!(
                    "{command} attempt {attempt}/{}: {e}",
                    self.link.max_attempts
                ),
            }
        }

        Err(ProtocolError::NoResponse {
            expected,
            last_seen,
        })
    }

    /// Drain whatever is already buffered on the input side. Never blocks:
    /// only bytes the transport reports as available are consumed.
    pub fn flush_read_buffer(&mut self) -> Result<usize, TransportError> {
        let mut flushed = 0;
        while self.transport.bytes_available()? > 0 {
            let _ = self.transport.receive_byte()?;
            flushed += 1;
        }
        Ok(flushed)
    }

    // ── Internal ──────────────────────────────────────────────

    /// One send/receive/validate attempt.
    fn attempt(
        &mut self,
        frame: &Frame,
        command: Command,
        expected: Command,
        last_seen: &mut Command,
    ) -> Result<AnyPacket, ProtocolError> {
        self.transport.send_bytes(frame)?;

        let reply = self.receive_frame()?;
        let packet = self.registry.decode(&reply)?;
        *last_seen = packet.command();

        if packet.command() != expected {
            return Err(ProtocolError::UnexpectedResponse {
                expected,
                got: packet.command(),
            });
        }

        // A matching ACK must also name the outstanding command; an ACK
        // for anything else is a leftover from an earlier conversation.
        if let AnyPacket::Ack(ack) = &packet {
            if ack.acked != command {
                return Err(ProtocolError::MisdirectedAck {
                    requested: command,
                    acked: ack.acked,
                });
            }
        }

        Ok(packet)
    }

    /// Block for exactly one frame's worth of bytes.
    fn receive_frame(&mut self) -> Result<Frame, TransportError> {
        let mut frame: Frame = [0; FRAME_LEN];
        for slot in &mut frame {
            *slot = self.transport.receive_byte()?;
        }
        Ok(frame)
    }
}

//! Serial command/response protocol for the io-controller link.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Protocol Stack                          │
//! │                                                              │
//! │  ┌───────────┐   ┌───────────┐   ┌────────────────────────┐  │
//! │  │ Transport │──▶│   Codec   │──▶│  Channel               │  │
//! │  │ (trait)   │   │ (framing, │   │  send_and_receive      │  │
//! │  │           │◀──│  registry)│◀──│  + bounded retry       │  │
//! │  └───────────┘   └───────────┘   └────────────────────────┘  │
//! │                        ▲                     ▲               │
//! │                  ┌───────────┐        ┌────────────┐         │
//! │                  │  Packets  │        │  Command   │         │
//! │                  │ (typed)   │        │  registry  │         │
//! │                  └───────────┘        └────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Strictly half-duplex: one request in flight, fixed 24-byte frames,
//! bounded retry with buffer flushing between attempts.

pub mod channel;
pub mod codec;
pub mod command;
pub mod packet;
pub mod transport;

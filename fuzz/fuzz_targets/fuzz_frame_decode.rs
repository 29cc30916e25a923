//! Fuzz target: `DecoderRegistry::decode`
//!
//! Drives arbitrary byte sequences into the frame decoder and asserts
//! that it never panics and that every accepted frame reports a command
//! consistent with its opcode byte.
//!
//! cargo fuzz run fuzz_frame_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use sattrak::protocol::codec::{DecoderRegistry, FRAME_LEN, LOC_OPCODE, SENTINEL};
use sattrak::protocol::command::Command;

fuzz_target!(|data: &[u8]| {
    let registry = DecoderRegistry::default();

    match registry.decode(data) {
        Ok(packet) => {
            // Decoding only succeeds on sentinel-led input of at least
            // one frame, and the variant must match the opcode byte.
            assert!(data.len() >= FRAME_LEN);
            assert_eq!(data[0], SENTINEL);
            assert_eq!(packet.command(), Command::from_opcode(data[LOC_OPCODE]));
        }
        Err(_) => {
            // Typed rejection is fine; panicking is not.
        }
    }
});

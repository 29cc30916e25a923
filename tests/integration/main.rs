//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below exercises a subsystem against the mock rig — a
//! scripted serial link plus recording capture/event adapters. All tests
//! run on the host with no hardware attached.

mod channel_tests;
mod mock_rig;
mod scheduler_tests;

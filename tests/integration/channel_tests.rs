//! Integration tests for the RigService → Channel → transport pipeline.

use std::time::Duration;

use sattrak::app::service::RigService;
use sattrak::config::SystemConfig;
use sattrak::error::{Error, ProtocolError};
use sattrak::protocol::codec::{FRAME_LEN, LOC_OPCODE, LOC_SENTINEL, SENTINEL};
use sattrak::protocol::command::Command;
use sattrak::protocol::packet::{EnvResponsePacket, GpsResponsePacket, OrientationResponsePacket};

use crate::mock_rig::{ack_frame, frame_of, MockLink};

/// Config with all delays collapsed so tests run fast.
fn fast_config(max_attempts: u32) -> SystemConfig {
    SystemConfig {
        max_attempts,
        retry_delay_ms: 0,
        device_boot_delay_ms: 0,
        motor_settling_ms: 100,
        ..SystemConfig::default()
    }
}

fn make_rig(max_attempts: u32) -> (RigService, MockLink) {
    let link = MockLink::new();
    let rig = RigService::new(Box::new(link.clone()), &fast_config(max_attempts));
    (rig, link)
}

// ── Connection establishment ──────────────────────────────────

#[test]
fn connect_succeeds_when_device_acks_on_third_attempt() {
    let (rig, link) = make_rig(5);
    link.push_silence();
    link.push_silence();
    link.push_reply(ack_frame(Command::EstablishConnection));

    rig.connect().unwrap();
    assert_eq!(link.sent_count(), 3);
}

#[test]
fn connect_fails_after_max_attempts_of_silence() {
    let (rig, link) = make_rig(5);
    for _ in 0..5 {
        link.push_silence();
    }

    let err = rig.connect().expect_err("silent device");
    match err {
        Error::Protocol(ProtocolError::NoResponse { expected, .. }) => {
            assert_eq!(expected, Command::Ack);
        }
        other => panic!("expected NoResponse, got {other:?}"),
    }
    assert_eq!(link.sent_count(), 5);
}

#[test]
fn connect_ignores_ack_for_another_command() {
    let (rig, link) = make_rig(3);
    // An ACK, but for SET_ORIENTATION — a leftover from a previous run.
    link.push_reply(ack_frame(Command::SetOrientation));
    link.push_reply(ack_frame(Command::EstablishConnection));

    rig.connect().unwrap();
    assert_eq!(link.sent_count(), 2);
}

// ── Orientation round trip ────────────────────────────────────

#[test]
fn set_orientation_round_trip() {
    let (rig, link) = make_rig(5);
    link.push_reply(ack_frame(Command::SetOrientation));

    rig.set_orientation(175.0, 45.0).unwrap();

    // The request on the wire is a well-formed SET_ORIENTATION frame
    // carrying the angles big-endian at their fixed offsets.
    let sent = link.sent_frames();
    assert_eq!(sent.len(), 1);
    let frame = &sent[0];
    assert_eq!(frame.len(), FRAME_LEN);
    assert_eq!(frame[LOC_SENTINEL], SENTINEL);
    assert_eq!(frame[LOC_OPCODE], Command::SetOrientation.opcode());
    assert_eq!(frame[2..10], 175.0f64.to_be_bytes());
    assert_eq!(frame[10..18], 45.0f64.to_be_bytes());
}

#[test]
fn read_orientation_returns_the_reported_pointing() {
    let (rig, link) = make_rig(5);
    link.push_reply(frame_of(&OrientationResponsePacket {
        azimuth_deg: 12.5,
        elevation_deg: 67.25,
    }));

    let pointing = rig.orientation().unwrap();
    assert_eq!(pointing.azimuth_deg, 12.5);
    assert_eq!(pointing.elevation_deg, 67.25);
}

// ── Sensor reads ──────────────────────────────────────────────

#[test]
fn environment_read_round_trip() {
    let (rig, link) = make_rig(5);
    link.push_reply(frame_of(&EnvResponsePacket {
        temperature_c: -7,
        humidity_pct: 93,
    }));

    let env = rig.environment().unwrap();
    assert_eq!(env.temperature_c, -7);
    assert_eq!(env.humidity_pct, 93);
}

#[test]
fn gps_read_round_trip() {
    let (rig, link) = make_rig(5);
    link.push_reply(frame_of(&GpsResponsePacket {
        latitude_deg: 42.4433,
        longitude_deg: -76.5019,
    }));

    let fix = rig.gps().unwrap();
    assert_eq!(fix.latitude_deg, 42.4433);
    assert_eq!(fix.longitude_deg, -76.5019);
}

// ── Recovery across conversations ─────────────────────────────

#[test]
fn failed_exchange_does_not_poison_the_next_one() {
    let (rig, link) = make_rig(2);

    // First conversation dies (silence on both attempts).
    link.push_silence();
    link.push_silence();
    assert!(rig.gps().is_err());

    // Second conversation succeeds cleanly.
    link.push_reply(frame_of(&GpsResponsePacket {
        latitude_deg: 1.0,
        longitude_deg: 2.0,
    }));
    assert!(rig.gps().is_ok());
}

#[test]
fn garbage_reply_is_retried_until_a_clean_frame() {
    let (rig, link) = make_rig(3);

    // A frame's worth of garbage, then the real response.
    link.push_reply(vec![0x55; FRAME_LEN]);
    link.push_reply(frame_of(&GpsResponsePacket {
        latitude_deg: 3.0,
        longitude_deg: 4.0,
    }));

    let fix = rig.gps().unwrap();
    assert_eq!(fix.latitude_deg, 3.0);
    assert_eq!(link.sent_count(), 2);
}

#[test]
fn slow_reply_within_timeout_still_succeeds() {
    let (rig, link) = make_rig(2);
    link.set_reply_delay(Duration::from_millis(50));
    link.push_reply(ack_frame(Command::SetOrientation));

    rig.set_orientation(0.0, 0.0).unwrap();
}

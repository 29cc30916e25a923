//! Integration tests for the scheduler → channel → capture pipeline.
//!
//! Timing here uses a small settling delay (100 ms) and generous
//! post-run sleeps so the assertions hold on a loaded CI host.

use std::thread;
use std::time::{Duration, SystemTime};

use sattrak::app::service::RigService;
use sattrak::config::SystemConfig;
use sattrak::error::{Error, TaskError};
use sattrak::protocol::command::Command;
use sattrak::task::Task;

use crate::mock_rig::{ack_frame, MockLink, RecordingCapture, RecordingSink};

const SETTLING_MS: u64 = 100;

fn fast_config(max_attempts: u32) -> SystemConfig {
    SystemConfig {
        max_attempts,
        retry_delay_ms: 0,
        device_boot_delay_ms: 0,
        motor_settling_ms: SETTLING_MS,
        ..SystemConfig::default()
    }
}

fn task_in(ms: u64, title: &str) -> Task {
    Task::new(
        Some(title.to_string()),
        175.0,
        45.0,
        SystemTime::now() + Duration::from_millis(ms),
        Duration::from_secs(1),
    )
}

fn started_rig(
    link: &MockLink,
    max_attempts: u32,
) -> (RigService, RecordingCapture, RecordingSink) {
    let mut rig = RigService::new(Box::new(link.clone()), &fast_config(max_attempts));
    let capture = RecordingCapture::new();
    let sink = RecordingSink::new();
    rig.start(Box::new(capture.clone()), Box::new(sink.clone()));
    (rig, capture, sink)
}

// ── Admission ─────────────────────────────────────────────────

#[test]
fn late_task_is_rejected_at_submission() {
    let link = MockLink::new();
    let (rig, _capture, _sink) = started_rig(&link, 1);

    // 1 ms less lead time than the settling delay.
    let err = rig
        .schedule(task_in(SETTLING_MS - 1, "too late"))
        .expect_err("insufficient lead time");

    assert!(matches!(
        err,
        Error::Task(TaskError::NotSchedulable { .. })
    ));
    assert_eq!(rig.scheduler().pending(), 0);
}

#[test]
fn generous_lead_time_is_admitted() {
    let link = MockLink::new();
    let (rig, _capture, _sink) = started_rig(&link, 1);

    rig.schedule(task_in(SETTLING_MS + 5000, "plenty of time"))
        .unwrap();
    assert_eq!(rig.scheduler().pending(), 1);
}

// ── Execution pipeline ────────────────────────────────────────

#[test]
fn due_task_points_then_captures_at_the_instant() {
    let link = MockLink::new();
    link.push_reply(ack_frame(Command::SetOrientation));

    let (rig, capture, sink) = started_rig(&link, 2);

    let task = task_in(SETTLING_MS + 150, "pass");
    let scheduled_at = task.scheduled_at;
    rig.schedule(task).unwrap();

    thread::sleep(Duration::from_millis(SETTLING_MS + 600));

    let calls = capture.calls();
    assert_eq!(calls.len(), 1, "capture must fire exactly once");
    assert_eq!(calls[0].0, "pass");
    assert!(
        calls[0].1 >= scheduled_at,
        "capture fired before the scheduled instant"
    );
    assert_eq!(sink.completed_titles(), vec!["pass".to_string()]);
    assert!(sink.failed_titles().is_empty());
}

#[test]
fn unresponsive_mount_fails_the_task_without_capture() {
    let link = MockLink::new();
    link.push_silence();
    link.push_silence();

    let (rig, capture, sink) = started_rig(&link, 2);
    rig.schedule(task_in(SETTLING_MS + 100, "doomed")).unwrap();

    thread::sleep(Duration::from_millis(SETTLING_MS + 500));

    assert!(capture.calls().is_empty(), "no capture on failure");
    assert_eq!(sink.failed_titles(), vec!["doomed".to_string()]);
    assert!(
        rig.scheduler().fatal_error().is_none(),
        "a task failure is not fatal to the worker"
    );
}

#[test]
fn failed_task_does_not_stop_the_next_one() {
    let link = MockLink::new();
    // Task one: silence on both attempts. Task two: immediate ACK.
    link.push_silence();
    link.push_silence();
    link.push_reply(ack_frame(Command::SetOrientation));

    let (rig, capture, sink) = started_rig(&link, 2);
    rig.schedule(task_in(SETTLING_MS + 100, "first")).unwrap();
    rig.schedule(task_in(SETTLING_MS + 400, "second")).unwrap();

    thread::sleep(Duration::from_millis(SETTLING_MS + 900));

    assert_eq!(sink.failed_titles(), vec!["first".to_string()]);
    assert_eq!(sink.completed_titles(), vec!["second".to_string()]);

    let calls = capture.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "second");
}

#[test]
fn pointing_confirmed_after_the_instant_fails_the_task() {
    let link = MockLink::new();
    // The mount takes 400 ms to confirm — past the trigger instant.
    link.set_reply_delay(Duration::from_millis(400));
    link.push_reply(ack_frame(Command::SetOrientation));

    let (rig, capture, sink) = started_rig(&link, 1);
    rig.schedule(task_in(SETTLING_MS + 50, "missed")).unwrap();

    thread::sleep(Duration::from_millis(SETTLING_MS + 900));

    assert!(capture.calls().is_empty(), "late pointing must not capture");
    assert_eq!(sink.failed_titles(), vec!["missed".to_string()]);
}

// ── Ad-hoc and scheduled callers share one channel ────────────

#[test]
fn adhoc_reads_interleave_with_scheduled_tasks() {
    let link = MockLink::new();
    let (rig, capture, _sink) = started_rig(&link, 2);

    // Scheduled task due 250 ms out; meanwhile the caller polls GPS.
    rig.schedule(task_in(SETTLING_MS + 250, "pass")).unwrap();

    link.push_reply(crate::mock_rig::frame_of(
        &sattrak::protocol::packet::GpsResponsePacket {
            latitude_deg: 42.0,
            longitude_deg: -76.0,
        },
    ));
    let fix = rig.gps().unwrap();
    assert_eq!(fix.latitude_deg, 42.0);

    link.push_reply(ack_frame(Command::SetOrientation));
    thread::sleep(Duration::from_millis(SETTLING_MS + 700));

    assert_eq!(capture.calls().len(), 1);
}

//! Mock rig for integration tests.
//!
//! [`MockLink`] plays the io-controller: each frame written to it is
//! answered with the next scripted reply (or silence). Recording
//! adapters capture everything the domain emits so tests can assert on
//! the full history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use sattrak::app::events::AppEvent;
use sattrak::app::ports::{CapturePort, EventSink};
use sattrak::error::TransportError;
use sattrak::protocol::codec::encode;
use sattrak::protocol::command::Command;
use sattrak::protocol::packet::{AckPacket, Packet};
use sattrak::protocol::transport::Transport;
use sattrak::task::Task;

// ── Scripted serial link ──────────────────────────────────────

struct LinkInner {
    replies: VecDeque<Option<Vec<u8>>>,
    rx: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
    reply_delay: Duration,
}

/// Device-side script: pops one reply per frame received. Clones share
/// state, so tests keep one handle for assertions while the channel owns
/// another.
#[derive(Clone)]
pub struct MockLink {
    inner: Arc<Mutex<LinkInner>>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LinkInner {
                replies: VecDeque::new(),
                rx: VecDeque::new(),
                sent: Vec::new(),
                reply_delay: Duration::ZERO,
            })),
        }
    }

    /// Queue a reply for the next unanswered request.
    pub fn push_reply(&self, frame: Vec<u8>) {
        self.inner.lock().unwrap().replies.push_back(Some(frame));
    }

    /// Queue silence: the next request gets no reply at all.
    pub fn push_silence(&self) {
        self.inner.lock().unwrap().replies.push_back(None);
    }

    /// Delay applied before each reply lands, simulating a slow device.
    pub fn set_reply_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().reply_delay = delay;
    }

    pub fn sent_count(&self) -> usize {
        self.inner.lock().unwrap().sent.len()
    }

    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.inner.lock().unwrap().sent.clone()
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockLink {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let delay = {
            let mut inner = self.inner.lock().unwrap();
            inner.sent.push(bytes.to_vec());
            inner.reply_delay
        };
        // Sleep outside the lock so assertions are not blocked.
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let mut inner = self.inner.lock().unwrap();
        if let Some(Some(reply)) = inner.replies.pop_front() {
            inner.rx.extend(reply);
        }
        Ok(())
    }

    fn receive_byte(&mut self) -> Result<u8, TransportError> {
        self.inner
            .lock()
            .unwrap()
            .rx
            .pop_front()
            .ok_or(TransportError::Closed)
    }

    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        Ok(self.inner.lock().unwrap().rx.len())
    }
}

/// ACK frame for the given command, as the device would send it.
pub fn ack_frame(acked: Command) -> Vec<u8> {
    encode(&AckPacket { acked }).to_vec()
}

/// Any packet rendered to its wire frame.
#[allow(dead_code)]
pub fn frame_of(packet: &dyn Packet) -> Vec<u8> {
    encode(packet).to_vec()
}

// ── Recording capture adapter ─────────────────────────────────

#[derive(Clone)]
pub struct RecordingCapture {
    calls: Arc<Mutex<Vec<(String, SystemTime)>>>,
}

#[allow(dead_code)]
impl RecordingCapture {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(String, SystemTime)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for RecordingCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CapturePort for RecordingCapture {
    fn begin_capture(&mut self, task: &Task) {
        self.calls
            .lock()
            .unwrap()
            .push((task.label().to_string(), SystemTime::now()));
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn completed_titles(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::TaskCompleted { title } => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn failed_titles(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AppEvent::TaskFailed { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

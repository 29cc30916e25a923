//! Time-ordered task scheduler.
//!
//! One worker thread consumes a delay queue of [`Task`]s and drives the
//! shared [`Channel`] to point the mount ahead of each task's trigger
//! instant.
//!
//! ```text
//! ┌───────────┐  schedule()   ┌─────────────┐  take()   ┌───────────────┐
//! │  Callers   │ ────────────▶ │ Delay queue │ ────────▶ │ Worker thread │
//! │ (any task  │  (admission   │ (heap +     │  (blocks  │ point → wait  │
//! │  producer) │   check)      │  condvar)   │  until    │ → capture     │
//! └───────────┘               └─────────────┘   due)     └───────────────┘
//! ```
//!
//! Per-task lifecycle: pending (queued) → due (delay elapsed) → executing
//! (worker drives the channel) → done or failed. Each execution is a
//! single shot — the scheduler never re-runs a failed task. A task's
//! failure is isolated; only a poisoned lock stops the worker, and that
//! is surfaced through [`Scheduler::fatal_error`], never swallowed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{CapturePort, EventSink};
use crate::error::{Error, SchedulerError, TaskError};
use crate::protocol::channel::Channel;
use crate::protocol::packet::SetOrientationPacket;
use crate::task::Task;

// ───────────────────────────────────────────────────────────────
// Delay queue
// ───────────────────────────────────────────────────────────────

/// Why a blocking take ended without a task.
enum TakeError {
    /// The queue was closed for shutdown.
    Closed,
    /// The queue lock was poisoned by a panicking thread.
    Poisoned,
}

struct QueueState {
    /// Min-heap on the scheduled instant. Ties are unordered.
    heap: BinaryHeap<Reverse<Task>>,
    closed: bool,
}

/// Blocking delay queue: `take` suspends until the earliest task's
/// settling-adjusted delay reaches zero.
struct DelayQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl DelayQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    fn push(&self, task: Task) -> Result<(), SchedulerError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SchedulerError::QueuePoisoned)?;
        state.heap.push(Reverse(task));
        self.available.notify_all();
        Ok(())
    }

    fn len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.heap.len())
    }

    /// Wake the worker and refuse further takes.
    fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
        }
        self.available.notify_all();
    }

    /// Block until a task is due, then pop it. Sleeps on the condvar with
    /// a timeout equal to the head's remaining delay — no spinning.
    fn take(&self, settling: Duration) -> Result<Task, TakeError> {
        let mut state = self.state.lock().map_err(|_| TakeError::Poisoned)?;
        loop {
            if state.closed {
                return Err(TakeError::Closed);
            }

            let next_delay_ms = state
                .heap
                .peek()
                .map(|Reverse(task)| task.delay_ms(SystemTime::now(), settling));

            match next_delay_ms {
                None => {
                    state = self.available.wait(state).map_err(|_| TakeError::Poisoned)?;
                }
                Some(delay_ms) if delay_ms <= 0 => {
                    if let Some(Reverse(task)) = state.heap.pop() {
                        return Ok(task);
                    }
                }
                Some(delay_ms) => {
                    let wait = Duration::from_millis(delay_ms as u64);
                    state = self
                        .available
                        .wait_timeout(state, wait)
                        .map_err(|_| TakeError::Poisoned)?
                        .0;
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Admission
// ───────────────────────────────────────────────────────────────

/// Admission check, split out so the boundary is testable against a
/// fabricated clock. A task needs at least the settling delay of lead
/// time; exactly the settling delay is accepted.
fn admit(task: &Task, now: SystemTime, settling: Duration) -> Result<(), TaskError> {
    let required_ms = settling.as_millis() as u64;
    let available_ms = task.lead_ms(now);
    if available_ms < required_ms as i64 {
        return Err(TaskError::NotSchedulable {
            required_ms,
            available_ms,
        });
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Scheduler
// ───────────────────────────────────────────────────────────────

/// Owns the delay queue and the worker thread.
pub struct Scheduler {
    queue: Arc<DelayQueue>,
    settling: Duration,
    worker: Option<thread::JoinHandle<()>>,
    fatal: Arc<Mutex<Option<SchedulerError>>>,
}

impl Scheduler {
    /// Scheduler with the given motor settling delay. No worker runs
    /// until [`start`](Self::start).
    pub fn new(settling: Duration) -> Self {
        Self {
            queue: Arc::new(DelayQueue::new()),
            settling,
            worker: None,
            fatal: Arc::new(Mutex::new(None)),
        }
    }

    /// Admit a task into the queue.
    ///
    /// Fails with [`TaskError::NotSchedulable`] when the scheduled
    /// instant leaves less lead time than the settling delay (the mount
    /// could not finish pointing before the trigger).
    pub fn schedule(&self, task: Task) -> Result<(), Error> {
        admit(&task, SystemTime::now(), self.settling)?;
        info!("scheduled {task}");
        self.queue.push(task)?;
        Ok(())
    }

    /// Spawn the worker thread. It runs until [`shutdown`](Self::shutdown)
    /// or a fatal queue/channel error.
    pub fn start(
        &mut self,
        channel: Arc<Mutex<Channel>>,
        capture: Box<dyn CapturePort>,
        sink: Box<dyn EventSink>,
    ) {
        let queue = Arc::clone(&self.queue);
        let settling = self.settling;
        let fatal = Arc::clone(&self.fatal);

        self.worker = Some(thread::spawn(move || {
            worker_loop(&queue, settling, &channel, capture, sink, &fatal);
        }));
    }

    /// Tasks still waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The error that terminated the worker, if any. The owning process
    /// should treat this as unrecoverable.
    pub fn fatal_error(&self) -> Option<SchedulerError> {
        self.fatal.lock().ok().and_then(|slot| *slot)
    }

    /// Close the queue and join the worker. Queued tasks are discarded;
    /// a task already executing finishes first (there is no abort path
    /// for an in-flight serial exchange or trigger wait).
    pub fn shutdown(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("scheduler worker panicked during shutdown");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ───────────────────────────────────────────────────────────────
// Worker
// ───────────────────────────────────────────────────────────────

fn worker_loop(
    queue: &DelayQueue,
    settling: Duration,
    channel: &Arc<Mutex<Channel>>,
    mut capture: Box<dyn CapturePort>,
    mut sink: Box<dyn EventSink>,
    fatal: &Mutex<Option<SchedulerError>>,
) {
    info!("scheduler worker started");
    loop {
        let task = match queue.take(settling) {
            Ok(task) => task,
            Err(TakeError::Closed) => {
                info!("scheduler worker stopping (queue closed)");
                break;
            }
            Err(TakeError::Poisoned) => {
                fail_fatal(SchedulerError::QueuePoisoned, fatal, sink.as_mut());
                break;
            }
        };

        if let Err(e) = execute(&task, channel, capture.as_mut(), sink.as_mut()) {
            fail_fatal(e, fatal, sink.as_mut());
            break;
        }
    }
}

/// Record a fatal worker error and tell the world before stopping.
fn fail_fatal(e: SchedulerError, fatal: &Mutex<Option<SchedulerError>>, sink: &mut dyn EventSink) {
    error!("scheduler worker stopping: {e}");
    if let Ok(mut slot) = fatal.lock() {
        *slot = Some(e);
    }
    sink.emit(&AppEvent::SchedulerStopped {
        reason: e.to_string(),
    });
}

/// Run one task to completion or isolated failure.
///
/// Returns `Err` only for fatal conditions (poisoned channel lock); a
/// failed task is reported through the sink and `Ok(())` is returned so
/// the worker proceeds to the next task.
fn execute(
    task: &Task,
    channel: &Arc<Mutex<Channel>>,
    capture: &mut dyn CapturePort,
    sink: &mut dyn EventSink,
) -> Result<(), SchedulerError> {
    info!("executing {task}");
    sink.emit(&AppEvent::TaskExecuting {
        title: task.label().to_string(),
        azimuth_deg: task.azimuth_deg,
        elevation_deg: task.elevation_deg,
    });

    let request = SetOrientationPacket {
        azimuth_deg: task.azimuth_deg,
        elevation_deg: task.elevation_deg,
    };

    // Hold the channel lock only for the exchange; the wait until the
    // trigger instant must not starve ad-hoc callers.
    let outcome = {
        let mut chan = channel
            .lock()
            .map_err(|_| SchedulerError::ChannelPoisoned)?;
        chan.send_and_receive(&request)
    };

    if let Err(e) = outcome {
        fail_task(task, &TaskError::OrientationFailed(e), sink);
        return Ok(());
    }

    // Pointing confirmed. Hold until the literal trigger instant; if it
    // slipped past while the mount was settling, the shot is lost.
    match task.scheduled_at.duration_since(SystemTime::now()) {
        Ok(remaining) => {
            if !remaining.is_zero() {
                thread::sleep(remaining);
            }
            capture.begin_capture(task);
            sink.emit(&AppEvent::TaskCompleted {
                title: task.label().to_string(),
            });
        }
        Err(late) => {
            let late_ms = late.duration().as_millis() as u64;
            fail_task(task, &TaskError::DeadlineMissed { late_ms }, sink);
        }
    }

    Ok(())
}

fn fail_task(task: &Task, error: &TaskError, sink: &mut dyn EventSink) {
    warn!("task {task} failed: {error}");
    sink.emit(&AppEvent::TaskFailed {
        title: task.label().to_string(),
        reason: error.to_string(),
    });
}

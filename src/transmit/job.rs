//! Per-transmission bookkeeping: state, cancellation, progress and the
//! single-fire completion channel.
//!
//! The transmitter keeps a [`JobReporter`] on the keying thread and hands the
//! matching [`JobHandle`] to the caller.  The reporter is consumed when it
//! reports, so every job produces exactly one [`JobOutcome`].

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use super::transmitter::TransmitError;

// ---------------------------------------------------------------------------
// JobState
// ---------------------------------------------------------------------------

/// Lifecycle of a transmission.
///
/// ```text
/// Pending ──device opened──▶ Running ──last element──▶ Completed
///    │                          └──────stop──────────▶ Cancelled
///    ├──────────stop─────────────────────────────────▶ Cancelled
///    └──────device unavailable───────────────────────▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    /// Accepted, waiting for the output device.
    Pending = 0,
    /// Keying elements.
    Running = 1,
    Completed = 2,
    Cancelled = 3,
    Failed = 4,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => JobState::Pending,
            1 => JobState::Running,
            2 => JobState::Completed,
            3 => JobState::Cancelled,
            _ => JobState::Failed,
        }
    }

    /// `true` once the job can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

// ---------------------------------------------------------------------------
// JobOutcome
// ---------------------------------------------------------------------------

/// Terminal result delivered through [`JobHandle::wait`].
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed,
    Cancelled,
    Failed(TransmitError),
}

impl JobOutcome {
    fn state(&self) -> JobState {
        match self {
            JobOutcome::Completed => JobState::Completed,
            JobOutcome::Cancelled => JobState::Cancelled,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CancelInner {
    flag: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Cooperative cancellation flag with an interruptible sleep.
///
/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake any [`sleep`](Self::sleep) in progress.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::Release);
        let _guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
    }

    /// Block for `duration` or until cancelled, whichever comes first.
    ///
    /// Returns `true` when woken by cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            guard = match self.inner.wake.wait_timeout(guard, deadline - now) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Elements keyed so far out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub sent: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in `[0.0, 1.0]`; an empty job counts as done.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.sent as f32 / self.total as f32
        }
    }
}

// ---------------------------------------------------------------------------
// Shared job record
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct JobShared {
    id: u64,
    state: AtomicU8,
    cancel: CancelToken,
    sent: AtomicUsize,
    total: usize,
}

impl JobShared {
    fn new(id: u64, total: usize, state: JobState) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: AtomicU8::new(state as u8),
            cancel: CancelToken::new(),
            sent: AtomicUsize::new(0),
            total,
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: JobState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn progress(&self) -> Progress {
        Progress {
            sent: self.sent.load(Ordering::Acquire),
            total: self.total,
        }
    }

    /// Raise the cancel flag unless the job already finished.
    pub(crate) fn cancel(&self) -> bool {
        if self.state().is_terminal() {
            return false;
        }
        self.cancel.cancel();
        true
    }
}

// ---------------------------------------------------------------------------
// JobHandle
// ---------------------------------------------------------------------------

/// Caller's view of one transmission.
///
/// Poll it with [`state`](Self::state) / [`progress`](Self::progress), stop it
/// with [`cancel`](Self::cancel), and await the outcome with
/// [`wait`](Self::wait).
#[derive(Debug)]
pub struct JobHandle {
    shared: Arc<JobShared>,
    outcome: oneshot::Receiver<JobOutcome>,
    suppressed: bool,
}

impl JobHandle {
    /// New pending job plus the reporter the keying loop will drive.
    pub(crate) fn pending(id: u64, total: usize) -> (Self, JobReporter) {
        let shared = JobShared::new(id, total, JobState::Pending);
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            shared: Arc::clone(&shared),
            outcome: rx,
            suppressed: false,
        };
        let reporter = JobReporter {
            shared,
            tx: Some(tx),
        };
        (handle, reporter)
    }

    /// Handle for a request dropped because another job was running.
    pub(crate) fn suppressed(id: u64) -> Self {
        let shared = JobShared::new(id, 0, JobState::Completed);
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(JobOutcome::Completed);
        Self {
            shared,
            outcome: rx,
            suppressed: true,
        }
    }

    pub(crate) fn shared(&self) -> Arc<JobShared> {
        Arc::clone(&self.shared)
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> JobState {
        self.shared.state()
    }

    /// `true` while the job has not reached a terminal state.
    pub fn is_running(&self) -> bool {
        !self.state().is_terminal()
    }

    /// `true` when this request never reached the device because another
    /// transmission was already running.
    pub fn was_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Request cancellation.  No-op once the job is terminal.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    pub fn progress(&self) -> Progress {
        self.shared.progress()
    }

    /// Wait for the terminal outcome.
    pub async fn wait(self) -> JobOutcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            // JobReporter always sends before it is dropped; reaching this
            // means the keying task was torn down with the runtime.
            Err(_) => JobOutcome::Failed(TransmitError::Internal(
                "transmission task ended without reporting".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// JobReporter
// ---------------------------------------------------------------------------

/// Keying-loop side of a job.
#[derive(Debug)]
pub(crate) struct JobReporter {
    shared: Arc<JobShared>,
    tx: Option<oneshot::Sender<JobOutcome>>,
}

impl JobReporter {
    pub(crate) fn id(&self) -> u64 {
        self.shared.id
    }

    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.shared.cancel
    }

    pub(crate) fn mark_running(&self) {
        self.shared.set_state(JobState::Running);
    }

    pub(crate) fn advance(&self) {
        self.shared.sent.fetch_add(1, Ordering::AcqRel);
    }

    /// Record the terminal state and notify the handle.
    pub(crate) fn finish(mut self, outcome: JobOutcome) {
        self.report(outcome);
    }

    fn report(&mut self, outcome: JobOutcome) {
        if let Some(tx) = self.tx.take() {
            self.shared.set_state(outcome.state());
            // The caller may have dropped its handle.
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for JobReporter {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log::error!("transmit: job {} ended without an outcome", self.shared.id);
            self.report(JobOutcome::Failed(TransmitError::Internal(
                "keying loop panicked".into(),
            )));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

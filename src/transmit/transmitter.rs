//! The keying engine.
//!
//! [`Transmitter`] owns one [`AudioOutput`] and keys at most one job on it at
//! a time.  Each accepted request runs on `tokio::task::spawn_blocking`:
//!
//! ```text
//! transmit(text, wpm, tone)
//!   └─▶ validate → encode → Schedule
//!         ├─ busy      → suppressed handle (already Completed)
//!         └─ idle      → spawn_blocking(keying loop)          [Pending]
//!                          ├─ output.open()                     [Running]
//!                          │    └─ Err → DeviceUnavailable      [Failed]
//!                          ├─ per element: check cancel,
//!                          │    play tone / silence, sleep       (cancellable)
//!                          │    └─ cancelled → halt output      [Cancelled]
//!                          └─ session.finish()                  [Completed]
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;

use crate::audio::{frames_for, synthesize_tone, AudioOutput, OutputSession};
use crate::morse::timing::validate_tone;
use crate::morse::{encode, TimingProfile};

use super::job::{JobHandle, JobOutcome, JobReporter, JobShared};
use super::schedule::Schedule;

// ---------------------------------------------------------------------------
// TransmitError
// ---------------------------------------------------------------------------

/// Errors surfaced by the transmitter, either directly from a request or as
/// the outcome of a job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransmitError {
    /// Rate or tone outside its supported range.
    #[error("{name} {value} is outside the supported range {min}..={max}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The output backend could not be acquired.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The output failed while flushing a finished transmission.
    #[error("audio output failed: {0}")]
    Output(String),

    /// No tokio runtime, or the keying task vanished.
    #[error("internal transmitter error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Transmitter
// ---------------------------------------------------------------------------

type CurrentJob = Arc<Mutex<Option<Arc<JobShared>>>>;

fn lock_current(current: &CurrentJob) -> MutexGuard<'_, Option<Arc<JobShared>>> {
    current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keys Morse messages on an audio output, one at a time.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use morse_messenger::audio::CpalOutput;
/// use morse_messenger::transmit::{JobOutcome, Transmitter};
///
/// # async fn example() {
/// let tx = Transmitter::new(Arc::new(CpalOutput::default()));
/// let handle = tx.transmit("CQ CQ DE W2ASM K", 20.0, 700.0).unwrap();
/// assert_eq!(handle.wait().await, JobOutcome::Completed);
/// # }
/// ```
pub struct Transmitter {
    output: Arc<dyn AudioOutput>,
    busy: Arc<AtomicBool>,
    current: CurrentJob,
    next_id: AtomicU64,
}

impl Transmitter {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            output,
            busy: Arc::new(AtomicBool::new(false)),
            current: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Encode `text` and key it at `wpm` with a `tone_hz` sidetone.
    ///
    /// Must be called from within a tokio runtime.  If another job is
    /// running the request is dropped and the returned handle is already
    /// `Completed` (see [`JobHandle::was_suppressed`]).
    ///
    /// # Errors
    ///
    /// [`TransmitError::InvalidParameter`] for an out-of-range rate or tone,
    /// [`TransmitError::Internal`] outside a tokio runtime.  Device failures
    /// arrive later through [`JobHandle::wait`].
    pub fn transmit(
        &self,
        text: &str,
        wpm: f64,
        tone_hz: f64,
    ) -> Result<JobHandle, TransmitError> {
        self.transmit_morse(&encode(text), wpm, tone_hz)
    }

    /// Key an already encoded symbol string.
    pub fn transmit_morse(
        &self,
        morse: &str,
        wpm: f64,
        tone_hz: f64,
    ) -> Result<JobHandle, TransmitError> {
        let timing = TimingProfile::new(wpm)?;
        let tone_hz = validate_tone(tone_hz)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransmitError::Internal(e.to_string()))?;

        let schedule = Schedule::from_morse(morse);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::info!("transmit: job {id} suppressed, a transmission is already running");
            return Ok(JobHandle::suppressed(id));
        }

        let (handle, reporter) = JobHandle::pending(id, schedule.len());
        *lock_current(&self.current) = Some(handle.shared());

        log::info!(
            "transmit: job {id} accepted ({} elements, {wpm} wpm, {tone_hz} Hz, ~{:.1} s)",
            schedule.len(),
            schedule.duration(&timing).as_secs_f64()
        );

        let job = KeyingJob {
            output: Arc::clone(&self.output),
            busy: Arc::clone(&self.busy),
            current: Arc::clone(&self.current),
            schedule,
            timing,
            tone_hz,
            reporter,
        };
        runtime.spawn_blocking(move || job.run());

        Ok(handle)
    }

    /// Cancel the job behind `handle` if it is still running.
    pub fn stop(&self, handle: &JobHandle) {
        if handle.shared().cancel() {
            log::info!("transmit: stop requested for job {}", handle.id());
        }
    }

    /// Cancel whatever job is running.  No-op when idle.
    pub fn stop_current(&self) {
        if let Some(job) = lock_current(&self.current).as_ref() {
            if job.cancel() {
                log::info!("transmit: stop requested for job {}", job.id());
            }
        }
    }

    /// `true` while a job holds the output.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn output_name(&self) -> &'static str {
        self.output.name()
    }
}

impl Drop for Transmitter {
    fn drop(&mut self) {
        self.stop_current();
    }
}

// ---------------------------------------------------------------------------
// KeyingJob
// ---------------------------------------------------------------------------

/// Everything the blocking keying loop owns.
struct KeyingJob {
    output: Arc<dyn AudioOutput>,
    busy: Arc<AtomicBool>,
    current: CurrentJob,
    schedule: Schedule,
    timing: TimingProfile,
    tone_hz: f64,
    reporter: JobReporter,
}

impl KeyingJob {
    fn run(self) {
        let outcome = self.key();
        let id = self.reporter.id();

        {
            let mut current = lock_current(&self.current);
            if current.as_ref().is_some_and(|job| job.id() == id) {
                *current = None;
            }
        }
        // Release before notifying so the caller can send again right away.
        self.busy.store(false, Ordering::Release);

        match &outcome {
            JobOutcome::Completed => log::info!("transmit: job {id} completed"),
            JobOutcome::Cancelled => log::info!("transmit: job {id} cancelled"),
            JobOutcome::Failed(e) => log::error!("transmit: job {id} failed: {e}"),
        }
        self.reporter.finish(outcome);
    }

    /// Open the output and key every element.  The session is dropped, and
    /// the device released, before this returns.
    fn key(&self) -> JobOutcome {
        let cancel = self.reporter.cancel_token();
        if cancel.is_cancelled() {
            return JobOutcome::Cancelled;
        }

        let mut session = match self.output.open() {
            Ok(session) => session,
            Err(e) => return JobOutcome::Failed(TransmitError::DeviceUnavailable(e.to_string())),
        };
        self.reporter.mark_running();

        let realtime = self.output.is_realtime();
        let sample_rate = session.sample_rate();
        log::debug!(
            "transmit: job {} keying on {} at {sample_rate} Hz",
            self.reporter.id(),
            self.output.name()
        );

        for element in self.schedule.elements() {
            if cancel.is_cancelled() {
                return halted(session.as_mut());
            }

            let keying = element.keying(&self.timing);
            if let Some(on) = keying.tone {
                session.play(&synthesize_tone(self.tone_hz, on, sample_rate));
                if self.hold(on, realtime) {
                    return halted(session.as_mut());
                }
            }

            session.silence(frames_for(keying.silence, sample_rate));
            if self.hold(keying.silence, realtime) {
                return halted(session.as_mut());
            }

            self.reporter.advance();
        }

        match session.finish() {
            Ok(()) => JobOutcome::Completed,
            Err(e) => JobOutcome::Failed(TransmitError::Output(e.to_string())),
        }
    }

    /// Wait out `duration` on realtime outputs.  Returns `true` if cancelled.
    fn hold(&self, duration: Duration, realtime: bool) -> bool {
        let cancel = self.reporter.cancel_token();
        if realtime {
            cancel.sleep(duration)
        } else {
            cancel.is_cancelled()
        }
    }
}

fn halted(session: &mut dyn OutputSession) -> JobOutcome {
    session.halt();
    JobOutcome::Cancelled
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

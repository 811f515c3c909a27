//! Output seam between the transmitter and an audio backend.
//!
//! An [`AudioOutput`] is shared by the transmitter and may be opened by only
//! one job at a time.  [`AudioOutput::open`] acquires the device and returns
//! an [`OutputSession`]; dropping the session releases the device.  Sessions
//! live entirely on the transmission thread, so they need not be `Send`.

use thiserror::Error;

use super::tone::DEFAULT_SAMPLE_RATE;

/// Failures while acquiring or driving an output backend.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("output device {0:?} not found")]
    DeviceNotFound(String),

    #[error("failed to enumerate output devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to query supported output configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("device sample format {0} is not supported (need f32)")]
    UnsupportedFormat(String),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("WAV output failed: {0}")]
    Wav(#[from] hound::Error),
}

/// An acquired output device.
pub trait OutputSession {
    /// Rate the session expects samples at.
    fn sample_rate(&self) -> u32;

    /// Queue mono samples in `[-1.0, 1.0]`.
    fn play(&mut self, samples: &[f32]);

    /// Queue `frames` frames of silence.
    fn silence(&mut self, frames: usize);

    /// Drop everything queued but not yet rendered.
    fn halt(&mut self);

    /// Flush after the last element.  Called only on natural completion.
    fn finish(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// A backend the transmitter can key.
pub trait AudioOutput: Send + Sync {
    /// Acquire the backend for one transmission.
    fn open(&self) -> Result<Box<dyn OutputSession>, OutputError>;

    /// `true` when rendering happens in wall-clock time, so the transmitter
    /// must pace itself.  Offline backends are fed as fast as possible.
    fn is_realtime(&self) -> bool {
        true
    }

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}

// Compile-time assertion: Arc<dyn AudioOutput> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: std::sync::Arc<dyn AudioOutput>) {}
};

// ---------------------------------------------------------------------------
// NullOutput
// ---------------------------------------------------------------------------

/// Realtime backend that discards all samples.
///
/// Keeps the timing of a real transmission without touching audio hardware.
#[derive(Debug, Clone, Default)]
pub struct NullOutput;

struct NullSession;

impl OutputSession for NullSession {
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }

    fn play(&mut self, _samples: &[f32]) {}

    fn silence(&mut self, _frames: usize) {}

    fn halt(&mut self) {}
}

impl AudioOutput for NullOutput {
    fn open(&self) -> Result<Box<dyn OutputSession>, OutputError> {
        Ok(Box::new(NullSession))
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

// ---------------------------------------------------------------------------
// RecordingOutput (test double)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use recording::{Recorded, RecordingOutput};

#[cfg(test)]
mod recording {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// One call observed on a [`RecordingOutput`] session.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Recorded {
        Tone(usize),
        Silence(usize),
        Halt,
        Finish,
    }

    #[derive(Default)]
    struct Counters {
        open_now: AtomicUsize,
        max_open: AtomicUsize,
        opens: AtomicUsize,
        events: Mutex<Vec<Recorded>>,
    }

    /// Backend that records every call and tracks concurrently open sessions.
    #[derive(Clone)]
    pub struct RecordingOutput {
        counters: Arc<Counters>,
        realtime: bool,
        fail_open: bool,
    }

    impl RecordingOutput {
        /// Realtime recorder — the transmitter sleeps through each element.
        pub fn realtime() -> Self {
            Self {
                counters: Arc::default(),
                realtime: true,
                fail_open: false,
            }
        }

        /// Offline recorder — the transmitter does not sleep.
        pub fn offline() -> Self {
            Self {
                realtime: false,
                ..Self::realtime()
            }
        }

        /// Recorder whose `open` always fails with `NoDevice`.
        pub fn unavailable() -> Self {
            Self {
                fail_open: true,
                ..Self::offline()
            }
        }

        pub fn events(&self) -> Vec<Recorded> {
            self.counters.events.lock().unwrap().clone()
        }

        pub fn tone_frames(&self) -> Vec<usize> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Recorded::Tone(n) => Some(n),
                    _ => None,
                })
                .collect()
        }

        pub fn opens(&self) -> usize {
            self.counters.opens.load(Ordering::SeqCst)
        }

        pub fn open_now(&self) -> usize {
            self.counters.open_now.load(Ordering::SeqCst)
        }

        pub fn max_open(&self) -> usize {
            self.counters.max_open.load(Ordering::SeqCst)
        }
    }

    struct RecordingSession {
        counters: Arc<Counters>,
    }

    impl RecordingSession {
        fn push(&self, event: Recorded) {
            self.counters.events.lock().unwrap().push(event);
        }
    }

    impl OutputSession for RecordingSession {
        fn sample_rate(&self) -> u32 {
            DEFAULT_SAMPLE_RATE
        }

        fn play(&mut self, samples: &[f32]) {
            self.push(Recorded::Tone(samples.len()));
        }

        fn silence(&mut self, frames: usize) {
            self.push(Recorded::Silence(frames));
        }

        fn halt(&mut self) {
            self.push(Recorded::Halt);
        }

        fn finish(&mut self) -> Result<(), OutputError> {
            self.push(Recorded::Finish);
            Ok(())
        }
    }

    impl Drop for RecordingSession {
        fn drop(&mut self) {
            self.counters.open_now.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl AudioOutput for RecordingOutput {
        fn open(&self) -> Result<Box<dyn OutputSession>, OutputError> {
            if self.fail_open {
                return Err(OutputError::NoDevice);
            }
            self.counters.opens.fetch_add(1, Ordering::SeqCst);
            let now = self.counters.open_now.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.max_open.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(RecordingSession {
                counters: Arc::clone(&self.counters),
            }))
        }

        fn is_realtime(&self) -> bool {
            self.realtime
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_output_accepts_everything() {
        let output = NullOutput;
        let mut session = output.open().unwrap();
        session.play(&[0.5; 16]);
        session.silence(100);
        session.halt();
        session.finish().unwrap();
        assert_eq!(session.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert!(output.is_realtime());
    }

    #[test]
    fn recording_output_tracks_open_sessions() {
        let output = RecordingOutput::offline();
        let a = output.open().unwrap();
        let b = output.open().unwrap();
        assert_eq!(output.open_now(), 2);
        assert_eq!(output.max_open(), 2);
        drop(a);
        drop(b);
        assert_eq!(output.open_now(), 0);
        assert_eq!(output.opens(), 2);
    }

    #[test]
    fn output_error_messages() {
        assert_eq!(
            OutputError::NoDevice.to_string(),
            "no output device found on the default audio host"
        );
        assert!(OutputError::DeviceNotFound("USB".into())
            .to_string()
            .contains("USB"));
    }
}

//! Speaker output via `cpal`.
//!
//! [`CpalOutput`] resolves the output device and stream configuration each
//! time a transmission opens it.  The returned session owns the running
//! stream; samples are pushed onto a shared queue that the cpal callback
//! drains, and dropping the session stops the stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::output::{AudioOutput, OutputError, OutputSession};
use super::tone::DEFAULT_SAMPLE_RATE;

/// Longest [`OutputSession::finish`] waits for queued audio to play out.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

type SampleQueue = Arc<Mutex<VecDeque<f32>>>;

fn lock_queue(queue: &SampleQueue) -> MutexGuard<'_, VecDeque<f32>> {
    // A panicking callback must not silence every later transmission.
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// CpalOutput
// ---------------------------------------------------------------------------

/// Audio output built on the default `cpal` host.
///
/// # Example
///
/// ```rust,no_run
/// use morse_messenger::audio::{AudioOutput, CpalOutput};
///
/// let output = CpalOutput::new(44_100, None);
/// let mut session = output.open().unwrap();
/// session.silence(4_410);
/// ```
#[derive(Debug, Clone)]
pub struct CpalOutput {
    /// Rate requested from the device when it supports it.
    preferred_rate: u32,
    /// Output device name — `None` means the system default.
    device_name: Option<String>,
}

impl CpalOutput {
    pub fn new(preferred_rate: u32, device_name: Option<String>) -> Self {
        Self {
            preferred_rate,
            device_name,
        }
    }

    fn device(&self) -> Result<cpal::Device, OutputError> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host.default_output_device().ok_or(OutputError::NoDevice),
            Some(wanted) => host
                .output_devices()?
                .find(|d| d.name().map(|n| n == *wanted).unwrap_or(false))
                .ok_or_else(|| OutputError::DeviceNotFound(wanted.clone())),
        }
    }

    /// Device default config, moved to `preferred_rate` when supported.
    fn stream_config(&self, device: &cpal::Device) -> Result<cpal::StreamConfig, OutputError> {
        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(OutputError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let channels = supported.channels();
        let mut config: cpal::StreamConfig = supported.into();

        let preferred_ok = device.supported_output_configs()?.any(|range| {
            range.channels() == channels
                && range.sample_format() == cpal::SampleFormat::F32
                && range.min_sample_rate().0 <= self.preferred_rate
                && range.max_sample_rate().0 >= self.preferred_rate
        });

        if preferred_ok {
            config.sample_rate = cpal::SampleRate(self.preferred_rate);
        } else {
            log::warn!(
                "output device does not support {} Hz; using {} Hz",
                self.preferred_rate,
                config.sample_rate.0
            );
        }

        Ok(config)
    }
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, None)
    }
}

impl AudioOutput for CpalOutput {
    fn open(&self) -> Result<Box<dyn OutputSession>, OutputError> {
        let device = self.device()?;
        let config = self.stream_config(&device)?;
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;

        let queue: SampleQueue = Arc::new(Mutex::new(VecDeque::new()));
        let callback_queue = Arc::clone(&queue);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut queue = lock_queue(&callback_queue);
                for frame in data.chunks_mut(channels) {
                    let sample = queue.pop_front().unwrap_or(0.0);
                    frame.fill(sample);
                }
            },
            |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        log::debug!(
            "audio: opened {:?} at {sample_rate} Hz, {channels} ch",
            device.name().unwrap_or_default()
        );

        Ok(Box::new(CpalSession {
            _stream: stream,
            queue,
            sample_rate,
        }))
    }

    fn name(&self) -> &'static str {
        "cpal"
    }
}

// ---------------------------------------------------------------------------
// CpalSession
// ---------------------------------------------------------------------------

/// Live output stream.  Dropping it stops the hardware stream.
struct CpalSession {
    _stream: cpal::Stream,
    queue: SampleQueue,
    sample_rate: u32,
}

impl OutputSession for CpalSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, samples: &[f32]) {
        lock_queue(&self.queue).extend(samples.iter().copied());
    }

    fn silence(&mut self, frames: usize) {
        lock_queue(&self.queue).extend(std::iter::repeat(0.0).take(frames));
    }

    fn halt(&mut self) {
        lock_queue(&self.queue).clear();
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while !lock_queue(&self.queue).is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

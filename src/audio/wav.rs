//! Offline output that renders a transmission to a 16-bit mono WAV file.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use super::output::{AudioOutput, OutputError, OutputSession};

/// Writes each transmission to `path`, replacing any previous contents.
#[derive(Debug, Clone)]
pub struct WavOutput {
    path: PathBuf,
    sample_rate: u32,
}

impl WavOutput {
    pub fn new(path: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            path: path.into(),
            sample_rate,
        }
    }
}

impl AudioOutput for WavOutput {
    fn open(&self) -> Result<Box<dyn OutputSession>, OutputError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(&self.path, spec)?;
        log::debug!("audio: writing {}", self.path.display());
        Ok(Box::new(WavSession {
            writer: Some(writer),
            sample_rate: self.sample_rate,
            failed: None,
        }))
    }

    fn is_realtime(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}

struct WavSession {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    sample_rate: u32,
    /// First write error; reported from `finish`.
    failed: Option<hound::Error>,
}

impl WavSession {
    fn write(&mut self, samples: impl Iterator<Item = f32>) {
        if self.failed.is_some() {
            return;
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        for sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            if let Err(e) = writer.write_sample(value) {
                self.failed = Some(e);
                return;
            }
        }
    }
}

impl OutputSession for WavSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, samples: &[f32]) {
        self.write(samples.iter().copied());
    }

    fn silence(&mut self, frames: usize) {
        self.write(std::iter::repeat(0.0).take(frames));
    }

    /// Samples are written as they arrive, so there is nothing to drop.
    fn halt(&mut self) {}

    fn finish(&mut self) -> Result<(), OutputError> {
        if let Some(e) = self.failed.take() {
            return Err(e.into());
        }
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

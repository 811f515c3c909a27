//! Audio output — tone synthesis and the backends a transmission can key.
//!
//! # Pipeline
//!
//! ```text
//! Transmitter → synthesize_tone → OutputSession::play ─┬─ CpalSession → queue → cpal callback
//!                                                      ├─ WavSession  → hound::WavWriter
//!                                                      └─ NullSession (discard)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use morse_messenger::audio::{synthesize_tone, AudioOutput, NullOutput};
//!
//! let output = NullOutput;
//! let mut session = output.open().unwrap();
//! let pulse = synthesize_tone(600.0, Duration::from_millis(60), session.sample_rate());
//! session.play(&pulse);
//! ```

pub mod device;
pub mod output;
pub mod tone;
pub mod wav;

pub use device::CpalOutput;
pub use output::{AudioOutput, NullOutput, OutputError, OutputSession};
pub use tone::{frames_for, synthesize_tone, DEFAULT_SAMPLE_RATE};
pub use wav::WavOutput;

#[cfg(test)]
pub use output::{Recorded, RecordingOutput};

use std::sync::Arc;

use crate::config::{AppPaths, AudioConfig, OutputBackend};

/// Build the backend selected in `config`.
///
/// Device acquisition is deferred to [`AudioOutput::open`], so this never
/// fails; an unavailable speaker surfaces when the first job starts.
pub fn create_output(config: &AudioConfig) -> Arc<dyn AudioOutput> {
    match config.backend {
        OutputBackend::Cpal => Arc::new(CpalOutput::new(config.sample_rate, config.device.clone())),
        OutputBackend::Wav => {
            let path = config
                .wav_path
                .clone()
                .unwrap_or_else(|| AppPaths::new().default_wav_file);
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("audio: cannot create {}: {e}", parent.display());
                }
            }
            Arc::new(WavOutput::new(path, config.sample_rate))
        }
        OutputBackend::Null => Arc::new(NullOutput),
    }
}

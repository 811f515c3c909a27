//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::callsign::is_valid_callsign;
use crate::morse::timing::validate_tone;
use crate::morse::TimingProfile;
use crate::transmit::TransmitError;

// ---------------------------------------------------------------------------
// StationConfig
// ---------------------------------------------------------------------------

/// Operator identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationConfig {
    /// Own callsign, e.g. `"W2ASM"`.  Sending is refused until it is valid.
    pub callsign: String,
}

impl StationConfig {
    /// Case and surrounding whitespace are ignored.
    pub fn has_valid_callsign(&self) -> bool {
        is_valid_callsign(&self.callsign.trim().to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// KeyingConfig
// ---------------------------------------------------------------------------

/// Sending speed and sidetone pitch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyingConfig {
    /// Words per minute, 4 – 60.
    pub wpm: f64,
    /// Sidetone frequency in Hz, 300 – 1000.
    pub tone_hz: f64,
}

impl Default for KeyingConfig {
    fn default() -> Self {
        Self {
            wpm: 10.0,
            tone_hz: 600.0,
        }
    }
}

impl KeyingConfig {
    /// Check both values against the transmitter's accepted ranges.
    pub fn validate(&self) -> Result<(), TransmitError> {
        TimingProfile::new(self.wpm)?;
        validate_tone(self.tone_hz)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Which backend keys the transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputBackend {
    /// Speakers via cpal.
    #[default]
    Cpal,
    /// Render to a WAV file.
    Wav,
    /// Discard audio, keep timing.
    Null,
}

/// Settings for the audio output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub backend: OutputBackend,
    /// Synthesis sample rate in Hz; cpal falls back to the device rate when
    /// this one is unsupported.
    pub sample_rate: u32,
    /// Output device name — `None` means the system default.
    pub device: Option<String>,
    /// WAV destination — `None` means [`AppPaths::default_wav_file`].
    pub wav_path: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: OutputBackend::default(),
            sample_rate: 44_100,
            device: None,
            wav_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use morse_messenger::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let mut config = AppConfig::load().unwrap();
///
/// config.keying.wpm = 18.0;
/// config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub station: StationConfig,
    pub keying: KeyingConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.station.callsign, "");
        assert!(!cfg.station.has_valid_callsign());

        let lower = StationConfig {
            callsign: " w2asm ".into(),
        };
        assert!(lower.has_valid_callsign());
        assert_eq!(cfg.keying.wpm, 10.0);
        assert_eq!(cfg.keying.tone_hz, 600.0);
        assert_eq!(cfg.audio.backend, OutputBackend::Cpal);
        assert_eq!(cfg.audio.sample_rate, 44_100);
        assert!(cfg.audio.device.is_none());
        assert!(cfg.keying.validate().is_ok());
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.keying.wpm, KeyingConfig::default().wpm);
        assert_eq!(config.audio.backend, OutputBackend::Cpal);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested/settings.toml");

        let mut cfg = AppConfig::default();
        cfg.station.callsign = "W2ASM".into();
        cfg.keying.wpm = 22.5;
        cfg.keying.tone_hz = 700.0;
        cfg.audio.backend = OutputBackend::Wav;
        cfg.audio.wav_path = Some(dir.path().join("qso.wav"));
        cfg.audio.device = Some("USB Audio".into());

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.station.callsign, "W2ASM");
        assert!(loaded.station.has_valid_callsign());
        assert_eq!(loaded.keying.wpm, 22.5);
        assert_eq!(loaded.keying.tone_hz, 700.0);
        assert_eq!(loaded.audio.backend, OutputBackend::Wav);
        assert_eq!(loaded.audio.wav_path, cfg.audio.wav_path);
        assert_eq!(loaded.audio.device.as_deref(), Some("USB Audio"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[station]\ncallsign = \"K1ABC\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.station.callsign, "K1ABC");
        assert!(loaded.station.has_valid_callsign());
        assert_eq!(loaded.keying.wpm, 10.0);
        assert_eq!(loaded.audio.sample_rate, 44_100);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "keying = 12").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn keying_validation_uses_transmitter_ranges() {
        let slow = KeyingConfig {
            wpm: 2.0,
            ..KeyingConfig::default()
        };
        assert!(matches!(
            slow.validate(),
            Err(TransmitError::InvalidParameter { name: "wpm", .. })
        ));

        let shrill = KeyingConfig {
            tone_hz: 1_200.0,
            ..KeyingConfig::default()
        };
        assert!(matches!(
            shrill.validate(),
            Err(TransmitError::InvalidParameter { name: "tone", .. })
        ));
    }
}

//! Keying-speed timing derived from a words-per-minute rate.
//!
//! One dot lasts `1.2 / wpm` seconds (the "PARIS" convention); every other
//! interval is a whole multiple of it.

use std::time::Duration;

use crate::transmit::TransmitError;

/// Slowest supported keying speed.
pub const MIN_WPM: f64 = 4.0;
/// Fastest supported keying speed.
pub const MAX_WPM: f64 = 60.0;
/// Lowest supported sidetone frequency in Hz.
pub const MIN_TONE_HZ: f64 = 300.0;
/// Highest supported sidetone frequency in Hz.
pub const MAX_TONE_HZ: f64 = 1000.0;

/// Per-element durations for one transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingProfile {
    wpm: f64,
    dot_secs: f64,
}

impl TimingProfile {
    /// Derive timings for `wpm`.
    ///
    /// # Errors
    ///
    /// [`TransmitError::InvalidParameter`] when `wpm` is outside
    /// `[MIN_WPM, MAX_WPM]` or not a finite number.
    pub fn new(wpm: f64) -> Result<Self, TransmitError> {
        if !(MIN_WPM..=MAX_WPM).contains(&wpm) {
            return Err(TransmitError::InvalidParameter {
                name: "wpm",
                value: wpm,
                min: MIN_WPM,
                max: MAX_WPM,
            });
        }
        Ok(Self {
            wpm,
            dot_secs: 1.2 / wpm,
        })
    }

    pub fn wpm(&self) -> f64 {
        self.wpm
    }

    pub fn dot_secs(&self) -> f64 {
        self.dot_secs
    }

    pub fn dash_secs(&self) -> f64 {
        self.dot_secs * 3.0
    }

    pub fn intra_symbol_gap_secs(&self) -> f64 {
        self.dot_secs
    }

    pub fn letter_gap_secs(&self) -> f64 {
        self.dot_secs * 3.0
    }

    pub fn word_gap_secs(&self) -> f64 {
        self.dot_secs * 7.0
    }

    pub fn dot(&self) -> Duration {
        Duration::from_secs_f64(self.dot_secs())
    }

    pub fn dash(&self) -> Duration {
        Duration::from_secs_f64(self.dash_secs())
    }

    pub fn intra_symbol_gap(&self) -> Duration {
        Duration::from_secs_f64(self.intra_symbol_gap_secs())
    }

    pub fn letter_gap(&self) -> Duration {
        Duration::from_secs_f64(self.letter_gap_secs())
    }

    pub fn word_gap(&self) -> Duration {
        Duration::from_secs_f64(self.word_gap_secs())
    }
}

/// Check a sidetone frequency against `[MIN_TONE_HZ, MAX_TONE_HZ]`.
pub(crate) fn validate_tone(tone_hz: f64) -> Result<f64, TransmitError> {
    if (MIN_TONE_HZ..=MAX_TONE_HZ).contains(&tone_hz) {
        Ok(tone_hz)
    } else {
        Err(TransmitError::InvalidParameter {
            name: "tone",
            value: tone_hz,
            min: MIN_TONE_HZ,
            max: MAX_TONE_HZ,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ten_wpm_durations() {
        let t = TimingProfile::new(10.0).unwrap();
        assert!(approx(t.dot_secs(), 0.12));
        assert!(approx(t.dash_secs(), 0.36));
        assert!(approx(t.intra_symbol_gap_secs(), 0.12));
        assert!(approx(t.letter_gap_secs(), 0.36));
        assert!(approx(t.word_gap_secs(), 0.84));
        assert!(t.dash() > t.dot());
    }

    #[test]
    fn durations_shrink_as_rate_rises() {
        let slow = TimingProfile::new(MIN_WPM).unwrap();
        let fast = TimingProfile::new(MAX_WPM).unwrap();
        assert!(fast.dot_secs() > 0.0);
        assert!(slow.dot_secs() > fast.dot_secs());
        assert!(slow.word_gap() > fast.word_gap());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(TimingProfile::new(4.0).is_ok());
        assert!(TimingProfile::new(60.0).is_ok());
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        for wpm in [0.0, 3.9, 60.1, 100.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    TimingProfile::new(wpm),
                    Err(TransmitError::InvalidParameter { name: "wpm", .. })
                ),
                "wpm = {wpm}"
            );
        }
    }

    #[test]
    fn tone_range() {
        assert_eq!(validate_tone(300.0).unwrap(), 300.0);
        assert_eq!(validate_tone(1000.0).unwrap(), 1000.0);
        assert!(validate_tone(299.0).is_err());
        assert!(validate_tone(1500.0).is_err());
        assert!(validate_tone(f64::NAN).is_err());
    }
}

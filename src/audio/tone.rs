//! Sine-wave pulse synthesis.

use std::f64::consts::TAU;
use std::time::Duration;

/// Sample rate used when the output does not dictate one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Number of frames covering `duration` at `sample_rate`, rounded to nearest.
pub fn frames_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

/// Render a full-scale sine pulse of `freq_hz` lasting `duration`.
///
/// Phase starts at zero and no envelope is applied, so pulse edges may click.
///
/// ```
/// use std::time::Duration;
/// use morse_messenger::audio::synthesize_tone;
///
/// let pulse = synthesize_tone(600.0, Duration::from_millis(100), 44_100);
/// assert_eq!(pulse.len(), 4_410);
/// assert!(pulse.iter().all(|s| (-1.0..=1.0).contains(s)));
/// ```
pub fn synthesize_tone(freq_hz: f64, duration: Duration, sample_rate: u32) -> Vec<f32> {
    let frames = frames_for(duration, sample_rate);
    let step = TAU * freq_hz / sample_rate as f64;
    (0..frames).map(|i| (step * i as f64).sin() as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_duration() {
        assert_eq!(frames_for(Duration::from_millis(120), 44_100), 5_292);
        assert_eq!(frames_for(Duration::ZERO, 44_100), 0);
        assert_eq!(
            synthesize_tone(700.0, Duration::from_millis(360), 44_100).len(),
            15_876
        );
    }

    #[test]
    fn starts_at_zero_phase() {
        let pulse = synthesize_tone(600.0, Duration::from_millis(10), 44_100);
        assert_eq!(pulse[0], 0.0);
        assert!(pulse[1] > 0.0);
    }

    #[test]
    fn reaches_full_scale() {
        let pulse = synthesize_tone(441.0, Duration::from_millis(50), 44_100);
        let peak = pulse.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.999, "peak = {peak}");
        assert!(peak <= 1.0);
    }

    #[test]
    fn frequency_sets_zero_crossing_rate() {
        // 1 kHz over 100 ms → 100 cycles → ~200 sign changes.
        let pulse = synthesize_tone(1_000.0, Duration::from_millis(100), 48_000);
        let crossings = pulse
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count();
        assert!((198..=202).contains(&crossings), "crossings = {crossings}");
    }
}

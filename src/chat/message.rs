//! Chat messages and simulated signal reports.

use std::ops::RangeInclusive;
use std::time::SystemTime;

use rand::Rng;

use crate::callsign::callsigns_in;

/// Signal-to-noise range, in dB, reported for simulated traffic.
pub const SNR_RANGE_DB: RangeInclusive<i32> = 10..=40;

/// Draw a signal report for a simulated message.
pub fn simulated_snr<R: Rng>(rng: &mut R) -> i32 {
    rng.gen_range(SNR_RANGE_DB)
}

/// Who keyed a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Keyed by this station.
    Sent,
    /// Heard from another station.
    Received,
}

/// One entry in the chat log.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub direction: Direction,
    pub sent_at: SystemTime,
    pub snr_db: i32,
    /// `true` while the transmitter is still keying this message.
    pub transmitting: bool,
}

impl Message {
    pub fn new(id: u64, text: impl Into<String>, direction: Direction, snr_db: i32) -> Self {
        Self {
            id,
            text: text.into(),
            direction,
            sent_at: SystemTime::now(),
            snr_db,
            transmitting: false,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.direction == Direction::Sent
    }

    /// Callsigns mentioned in the text, for linking to a lookup page.
    pub fn callsigns(&self) -> Vec<&str> {
        callsigns_in(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn snr_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(73);
        for _ in 0..1_000 {
            assert!(SNR_RANGE_DB.contains(&simulated_snr(&mut rng)));
        }
    }

    #[test]
    fn new_message_is_not_transmitting() {
        let msg = Message::new(1, "W2ASM CQ", Direction::Received, 25);
        assert!(!msg.transmitting);
        assert!(!msg.is_mine());
        assert_eq!(msg.snr_db, 25);
    }

    #[test]
    fn callsigns_are_extracted() {
        let msg = Message::new(2, "K1ABC DE W2ASM K", Direction::Sent, 30);
        assert_eq!(msg.callsigns(), vec!["K1ABC", "W2ASM"]);
    }
}

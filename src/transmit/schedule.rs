//! Symbol string → ordered keying elements → timed on/off intervals.

use std::time::Duration;

use crate::morse::TimingProfile;

/// One step of the keying loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Dot,
    Dash,
    /// Boundary between two letters of the same word.
    LetterGap,
    /// Boundary between two words.
    WordGap,
}

/// Tone and trailing silence produced by one [`Element`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keying {
    /// Key-down time, `None` for gaps.
    pub tone: Option<Duration>,
    /// Key-up time following the tone (or the whole gap).
    pub silence: Duration,
}

impl Element {
    /// Timing of this element.
    ///
    /// Dots and dashes are followed by one intra-symbol gap; letter and word
    /// boundaries are a single silence of their own length.
    pub fn keying(self, timing: &TimingProfile) -> Keying {
        match self {
            Element::Dot => Keying {
                tone: Some(timing.dot()),
                silence: timing.intra_symbol_gap(),
            },
            Element::Dash => Keying {
                tone: Some(timing.dash()),
                silence: timing.intra_symbol_gap(),
            },
            Element::LetterGap => Keying {
                tone: None,
                silence: timing.letter_gap(),
            },
            Element::WordGap => Keying {
                tone: None,
                silence: timing.word_gap(),
            },
        }
    }
}

/// A single tone-on or tone-off stretch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub tone: bool,
    pub duration: Duration,
}

/// Ordered elements for one transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    elements: Vec<Element>,
}

impl Schedule {
    /// Parse a symbol string.
    ///
    /// `.` and `-` are elements.  A run of one or two spaces, or any other
    /// character, is a letter boundary; a run of three or more spaces is a
    /// word boundary.  Adjacent boundaries merge into the widest one and
    /// boundaries at either end are dropped.
    ///
    /// ```
    /// use morse_messenger::transmit::{Element, Schedule};
    ///
    /// let s = Schedule::from_morse(".-   -");
    /// assert_eq!(s.elements(), &[Element::Dot, Element::Dash, Element::WordGap, Element::Dash]);
    /// ```
    pub fn from_morse(morse: &str) -> Self {
        let mut elements = Vec::new();
        let mut pending: Option<Element> = None;
        let mut spaces = 0usize;

        for ch in morse.chars() {
            if ch == ' ' {
                spaces += 1;
                continue;
            }
            if spaces > 0 {
                pending = widen(pending, gap_for_spaces(spaces));
                spaces = 0;
            }
            let element = match ch {
                '.' => Element::Dot,
                '-' => Element::Dash,
                _ => {
                    pending = widen(pending, Element::LetterGap);
                    continue;
                }
            };
            if let Some(gap) = pending.take() {
                if !elements.is_empty() {
                    elements.push(gap);
                }
            }
            elements.push(element);
        }

        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Flattened on/off sequence in keying order.
    pub fn intervals(&self, timing: &TimingProfile) -> Vec<Interval> {
        let mut out = Vec::with_capacity(self.elements.len() * 2);
        for element in &self.elements {
            let keying = element.keying(timing);
            if let Some(duration) = keying.tone {
                out.push(Interval {
                    tone: true,
                    duration,
                });
            }
            out.push(Interval {
                tone: false,
                duration: keying.silence,
            });
        }
        out
    }

    /// Total air time, gaps included.
    pub fn duration(&self, timing: &TimingProfile) -> Duration {
        self.intervals(timing).iter().map(|i| i.duration).sum()
    }
}

fn gap_for_spaces(spaces: usize) -> Element {
    if spaces >= 3 {
        Element::WordGap
    } else {
        Element::LetterGap
    }
}

fn widen(pending: Option<Element>, gap: Element) -> Option<Element> {
    match (pending, gap) {
        (Some(Element::WordGap), _) | (_, Element::WordGap) => Some(Element::WordGap),
        _ => Some(Element::LetterGap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::encode;
    use Element::*;

    #[test]
    fn sos_elements() {
        let s = Schedule::from_morse(&encode("SOS"));
        assert_eq!(
            s.elements(),
            &[Dot, Dot, Dot, LetterGap, Dash, Dash, Dash, LetterGap, Dot, Dot, Dot]
        );
    }

    #[test]
    fn triple_space_is_word_gap() {
        let s = Schedule::from_morse(&encode("E T"));
        assert_eq!(s.elements(), &[Dot, WordGap, Dash]);
    }

    #[test]
    fn five_spaces_is_one_word_gap() {
        assert_eq!(Schedule::from_morse(".     -").elements(), &[Dot, WordGap, Dash]);
    }

    #[test]
    fn other_separators_are_letter_gaps() {
        assert_eq!(Schedule::from_morse("./-").elements(), &[Dot, LetterGap, Dash]);
        assert_eq!(Schedule::from_morse(". / -").elements(), &[Dot, LetterGap, Dash]);
    }

    #[test]
    fn edge_gaps_are_dropped() {
        assert_eq!(Schedule::from_morse("   .-   ").elements(), &[Dot, Dash]);
        assert!(Schedule::from_morse("   ").is_empty());
        assert!(Schedule::from_morse("").is_empty());
    }

    #[test]
    fn element_keying_at_10_wpm() {
        let t = TimingProfile::new(10.0).unwrap();
        assert_eq!(Dot.keying(&t).tone, Some(t.dot()));
        assert_eq!(Dash.keying(&t).tone, Some(t.dash()));
        assert_eq!(Dash.keying(&t).silence, t.intra_symbol_gap());
        assert_eq!(LetterGap.keying(&t).tone, None);
        assert_eq!(LetterGap.keying(&t).silence, t.letter_gap());
        assert_eq!(WordGap.keying(&t).silence, t.word_gap());
    }

    #[test]
    fn intervals_alternate_tone_and_silence() {
        let t = TimingProfile::new(20.0).unwrap();
        let intervals = Schedule::from_morse(".- -").intervals(&t);
        let tones: Vec<bool> = intervals.iter().map(|i| i.tone).collect();
        assert_eq!(tones, vec![true, false, true, false, false, true, false]);
    }

    #[test]
    fn total_duration_of_e() {
        // dot + intra gap = 2 dots
        let t = TimingProfile::new(12.0).unwrap();
        let d = Schedule::from_morse(".").duration(&t).as_secs_f64();
        assert!((d - 0.2).abs() < 1e-6, "d = {d}");
    }
}

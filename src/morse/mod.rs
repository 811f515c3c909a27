//! Morse codec — text ↔ dot/dash symbol strings, plus keying-speed timing.
//!
//! # Spacing convention
//!
//! ```text
//! letters  → one space     "... --- ..."
//! words    → three spaces  "-.-. --.-   -.. ."
//! ```
//!
//! [`encode`] produces this form naturally: the space character maps to a
//! single space and patterns are joined by one more on each side.
//! [`decode`] reads the same form back, so `decode(encode(s)) == s` for any
//! supported text whose words are separated by single spaces.
//!
//! # Quick start
//!
//! ```rust
//! use morse_messenger::morse::{decode, encode, TimingProfile};
//!
//! assert_eq!(encode("sos"), "... --- ...");
//! assert_eq!(decode("... --- ...").unwrap(), "SOS");
//!
//! let timing = TimingProfile::new(10.0).unwrap();
//! assert!((timing.dot_secs() - 0.12).abs() < 1e-9);
//! ```

pub mod codec;
pub mod table;
pub mod timing;

pub use codec::{decode, encode, sanitize, CodecError, LETTER_SEPARATOR, WORD_SEPARATOR};
pub use table::SymbolTable;
pub use timing::{TimingProfile, MAX_TONE_HZ, MAX_WPM, MIN_TONE_HZ, MIN_WPM};

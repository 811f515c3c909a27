//! Morse Messenger — types text, keys it as CW tones, and keeps a chat log.
//!
//! * [`morse`] — text ↔ symbol-string codec and keying-speed timing.
//! * [`transmit`] — the one-at-a-time, cancellable keying engine.
//! * [`audio`] — sine synthesis and output backends (cpal, WAV, null).
//! * [`chat`] — message log, simulated received traffic, command loop.
//! * [`callsign`] — callsign recognition and lookup links.
//! * [`config`] — TOML-persisted settings.

pub mod audio;
pub mod callsign;
pub mod chat;
pub mod config;
pub mod morse;
pub mod transmit;

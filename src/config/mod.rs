//! Configuration module for Morse Messenger.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the station,
//! keying and audio output, `AppPaths` for cross-platform directories, and
//! TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig, KeyingConfig, OutputBackend, StationConfig};

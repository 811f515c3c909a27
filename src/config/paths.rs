//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir:
//!   Windows: %APPDATA%\morse-messenger\
//!   macOS:   ~/Library/Application Support/morse-messenger/
//!   Linux:   ~/.config/morse-messenger/
//!
//! Data dir (rendered WAV files):
//!   Windows: %LOCALAPPDATA%\morse-messenger\
//!   macOS:   ~/Library/Application Support/morse-messenger/
//!   Linux:   ~/.local/share/morse-messenger/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default location for the WAV output backend.
    pub default_wav_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "morse-messenger";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory when the platform has no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let default_wav_file = data_dir.join("last-transmission.wav");

        Self {
            config_dir,
            settings_file,
            default_wav_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .default_wav_file
            .extension()
            .is_some_and(|e| e == "wav"));
        assert!(paths.settings_file.starts_with(&paths.config_dir));
    }
}

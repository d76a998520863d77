//! Platform configuration paths resolved with the `dirs` crate.
//!
//! Layout:
//!
//!   Windows: %APPDATA%\alessandro\
//!   macOS:   ~/Library/Application Support/alessandro/
//!   Linux:   ~/.config/alessandro/
//!
//! The directory holds `settings.toml` and an optional `env.txt` with service
//! credentials in `KEY=value` form.

use std::path::PathBuf;

/// Resolved configuration file locations.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `env.txt`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the per-user credentials file (`env.txt`).
    pub credentials_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "alessandro";

    /// Name of the credentials file looked up both in the working directory
    /// and in [`AppPaths::config_dir`].
    pub const CREDENTIALS_FILE_NAME: &'static str = "env.txt";

    /// Resolves all paths, falling back to the current directory when the
    /// platform has no config directory.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self {
            settings_file: config_dir.join("settings.toml"),
            credentials_file: config_dir.join(Self::CREDENTIALS_FILE_NAME),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

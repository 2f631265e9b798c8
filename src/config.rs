//! # Configuration Module
//!
//! Data directory resolution and the optional JSON configuration file.
//!
//! ## Data Storage
//!
//! The library database lives in the platform-standard data directory:
//! - Linux: `~/.local/share/randpick/library.db`
//! - macOS: `~/Library/Application Support/randpick/library.db`
//! - Windows: `%APPDATA%\randpick\library.db`
//!
//! ## Configuration File
//!
//! `<config dir>/randpick/config.json`, every key optional:
//!
//! ```json
//! {
//!   "db_path": "/srv/music/library.db",
//!   "format_item": "$artist - $title",
//!   "format_album": "$albumartist - $album"
//! }
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "randpick";

/// Default output format for tracks.
pub const DEFAULT_FORMAT_ITEM: &str = "$artist - $album - $title";
/// Default output format for albums.
pub const DEFAULT_FORMAT_ALBUM: &str = "$albumartist - $album";

/// Returns the platform-appropriate data directory, creating it if needed.
///
/// # Errors
///
/// Fails if the system data directory cannot be determined or the
/// `randpick` subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Returns the default library database path.
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("library.db"))
}

/// Returns where the configuration file is looked up. The file itself may
/// not exist.
///
/// # Errors
///
/// Fails if the system config directory cannot be determined.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine system config directory."))?;
    Ok(config_dir.join(APP_DIR).join("config.json"))
}

/// Settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Path to the library database; `None` means [`get_db_path`]
    pub db_path: Option<PathBuf>,
    /// Template used when printing tracks
    pub format_item: String,
    /// Template used when printing albums
    pub format_album: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            format_item: DEFAULT_FORMAT_ITEM.to_string(),
            format_album: DEFAULT_FORMAT_ALBUM.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load from the default config file location, falling back to defaults
    /// when there is no file.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Override the database path, e.g. from `--library`.
    #[must_use]
    pub fn with_db_path(self, db_path: PathBuf) -> Self {
        Self {
            db_path: Some(db_path),
            ..self
        }
    }

    /// The configured database path, or the default one in the data
    /// directory.
    ///
    /// # Errors
    ///
    /// See [`get_db_path`]; only reached when no path is configured.
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => get_db_path(),
        }
    }

    /// Template for tracks or albums.
    #[must_use]
    pub fn format_for(&self, albums: bool) -> &str {
        if albums {
            &self.format_album
        } else {
            &self.format_item
        }
    }
}

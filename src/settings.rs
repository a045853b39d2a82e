//! # Settings
//!
//! Runtime tunables for the concurrency primitives. Every field has a default, so
//! a settings file only needs to name the values it overrides:
//!
//! ```json
//! { "thread_wait_timeout_ms": 10000 }
//! ```
//!
//! The binary reads the file named by [`SETTINGS_ENV_VAR`] when it is set.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use log::info;
use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON settings file.
pub const SETTINGS_ENV_VAR: &str = "VOXEL_CORE_SETTINGS";

/// Errors raised while loading [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The settings text is not valid JSON for [`Settings`].
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Timeouts used by [`Thread`](crate::core::sync::Thread) and the force-drain recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default bound for `Thread::wait`, in milliseconds.
    pub thread_wait_timeout_ms: u64,
    /// Overall bound for `ReentrantMutex::unlock_complete`, in milliseconds.
    pub unlock_complete_timeout_ms: u64,
    /// Pause between force-drain watcher runs, in milliseconds.
    pub unlock_poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thread_wait_timeout_ms: 5_000,
            unlock_complete_timeout_ms: 2_000,
            unlock_poll_interval_ms: 10,
        }
    }
}

impl Settings {
    /// Parses settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&text)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Loads the file named by [`SETTINGS_ENV_VAR`], or returns the defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(SETTINGS_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    /// [`Settings::thread_wait_timeout_ms`] as a [`Duration`].
    pub fn thread_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.thread_wait_timeout_ms)
    }

    /// [`Settings::unlock_complete_timeout_ms`] as a [`Duration`].
    pub fn unlock_complete_timeout(&self) -> Duration {
        Duration::from_millis(self.unlock_complete_timeout_ms)
    }

    /// [`Settings::unlock_poll_interval_ms`] as a [`Duration`].
    pub fn unlock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.unlock_poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "unlock_poll_interval_ms": 1 }"#).unwrap();
        assert_eq!(settings.unlock_poll_interval(), Duration::from_millis(1));
        assert_eq!(settings.thread_wait_timeout_ms, Settings::default().thread_wait_timeout_ms);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn round_trips_through_json() {
        let settings = Settings {
            thread_wait_timeout_ms: 1,
            unlock_complete_timeout_ms: 2,
            unlock_poll_interval_ms: 3,
        };
        let text = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&text).unwrap(), settings);
    }
}

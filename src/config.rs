//! Mascot Settings
//!
//! Tuning knobs for the companion, loaded from TOML or JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::controller::ControllerOptions;
use crate::dialogue::OverflowPolicy;
use crate::errors::{MascotError, Result};
use crate::mood::Mood;

/// Companion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inactivity before the companion dozes off (ms)
    pub idle_timeout_ms: u64,

    /// Spacing between idle checks (ms)
    pub tick_interval_ms: u64,

    /// How long `make_happy` lasts before reverting (ms)
    pub happy_duration_ms: u64,

    /// How long `make_excited` lasts before reverting (ms)
    pub excited_duration_ms: u64,

    /// Maximum number of pending dialogue lines
    pub dialogue_capacity: usize,

    /// What to drop when the dialogue queue is full
    pub overflow: OverflowPolicy,

    /// Mood at startup
    pub initial_mood: Mood,

    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    /// Start muted
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 60_000,
            tick_interval_ms: 5_000,
            happy_duration_ms: 3_000,
            excited_duration_ms: 2_000,
            dialogue_capacity: 16,
            overflow: OverflowPolicy::DropOldest,
            initial_mood: Mood::DEFAULT,
            volume: 0.3,
            muted: false,
        }
    }
}

impl Settings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn happy_duration(&self) -> Duration {
        Duration::from_millis(self.happy_duration_ms)
    }

    pub fn excited_duration(&self) -> Duration {
        Duration::from_millis(self.excited_duration_ms)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            initial_mood: self.initial_mood,
            idle_timeout: self.idle_timeout(),
        }
    }

    /// Rejects values the companion cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(MascotError::invalid("tick_interval_ms", "must be greater than zero"));
        }
        if self.dialogue_capacity == 0 {
            return Err(MascotError::invalid("dialogue_capacity", "must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(MascotError::invalid(
                "volume",
                format!("{} is outside 0.0 - 1.0", self.volume),
            ));
        }
        Ok(())
    }

    /// Configuration directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mascot", "mascot-mood").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }
}

/// Loads settings from `path`, or the default location when `None`.
///
/// A missing file yields the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Settings::default_path().ok_or(MascotError::ConfigPathUnavailable)?,
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| MascotError::config(&path, format!("Failed to read settings: {e}")))?;

    let settings: Settings = if is_json(&path) {
        serde_json::from_str(&content)
            .map_err(|e| MascotError::config(&path, format!("Invalid JSON settings: {e}")))?
    } else {
        toml::from_str(&content)
            .map_err(|e| MascotError::config(&path, format!("Invalid TOML settings: {e}")))?
    };

    settings.validate()?;
    tracing::info!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Writes settings to `path`, creating parent directories.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| MascotError::config(path, format!("Failed to create config dir: {e}")))?;
    }

    let content = if is_json(path) {
        serde_json::to_string_pretty(settings)
            .map_err(|e| MascotError::config(path, format!("Failed to serialize settings: {e}")))?
    } else {
        toml::to_string_pretty(settings)
            .map_err(|e| MascotError::config(path, format!("Failed to serialize settings: {e}")))?
    };

    fs::write(path, content)
        .map_err(|e| MascotError::config(path, format!("Failed to write settings: {e}")))?;

    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.idle_timeout(), Duration::from_secs(60));
        assert_eq!(settings.tick_interval(), Duration::from_secs(5));
        assert_eq!(settings.initial_mood, Mood::Idle);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "idle_timeout_ms = 1500\ninitial_mood = \"neutral\"\noverflow = \"drop-newest\"\n",
        )
        .unwrap();

        let settings = load_settings(Some(path.as_path())).unwrap();
        assert_eq!(settings.idle_timeout(), Duration::from_millis(1500));
        assert_eq!(settings.initial_mood, Mood::Idle);
        assert_eq!(settings.overflow, OverflowPolicy::DropNewest);
        assert_eq!(settings.tick_interval_ms, 5_000);
    }

    #[test]
    fn test_json_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"initial_mood": "curious", "muted": true}"#).unwrap();

        let settings = load_settings(Some(path.as_path())).unwrap();
        assert_eq!(settings.initial_mood, Mood::Curious);
        assert!(settings.muted);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "tick_interval_ms = 0\n").unwrap();

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, MascotError::InvalidSetting { .. }));
    }

    #[test]
    fn test_unknown_mood_in_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "initial_mood = \"grumpy\"\n").unwrap();

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, MascotError::ConfigurationError { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            volume: 0.5,
            dialogue_capacity: 4,
            ..Settings::default()
        };

        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings(Some(path.as_path())).unwrap(), settings);
    }
}

//! Player settings
//!
//! Persisted separately from scores. The game folds these into its snapshot
//! at start-up and whenever the player changes them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence;

/// Allowed tilt sensitivity range
pub const MIN_SENSITIVITY: f32 = 0.5;
pub const MAX_SENSITIVITY: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tilt multiplier (0.5 - 2.0)
    pub sensitivity: f32,
    /// Play a sound on crash
    pub sound_on: bool,
    /// Vibrate on crash
    pub haptics_on: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            sound_on: true,
            haptics_on: true,
        }
    }
}

impl Settings {
    /// Copy with sensitivity forced into range (non-finite becomes 1.0)
    pub fn sanitized(self) -> Self {
        let sensitivity = if self.sensitivity.is_finite() {
            self.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        } else {
            Self::default().sensitivity
        };
        Self { sensitivity, ..self }
    }

    /// Load settings from disk, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match persistence::read_json::<Settings>(path) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        persistence::write_json(path.as_ref(), self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps() {
        let high = Settings {
            sensitivity: 9.0,
            ..Settings::default()
        };
        assert_eq!(high.sanitized().sensitivity, 2.0);

        let low = Settings {
            sensitivity: 0.1,
            ..Settings::default()
        };
        assert_eq!(low.sanitized().sensitivity, 0.5);

        let nan = Settings {
            sensitivity: f32::NAN,
            sound_on: false,
            haptics_on: false,
        };
        let fixed = nan.sanitized();
        assert_eq!(fixed.sensitivity, 1.0);
        assert!(!fixed.sound_on);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            sensitivity: 1.5,
            sound_on: false,
            haptics_on: true,
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_missing_and_corrupt_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load(&path), Settings::default());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }
}

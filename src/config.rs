use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::GazelineError;
use crate::annotation::{DEFAULT_FRAME_RATE, Taxonomy};
use crate::recording::keymap::{KeyBinding, Keymap, default_bindings};

const CONFIG_FILE_NAME: &str = "config.json";

/// Fastest cadence at which playback position samples are applied
pub const REFRESH_RATE_MS: u64 = 16;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Used when the video does not report a frame rate
    pub default_frame_rate: f64,
    pub refresh_rate_ms: u64,
    pub taxonomy: Taxonomy,
    pub seek_step_s: f64,
    pub seek_step_large_s: f64,
    /// Replaces the taxonomy's default bindings when set
    pub key_bindings: Option<Vec<KeyBinding>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: DEFAULT_FRAME_RATE,
            refresh_rate_ms: REFRESH_RATE_MS,
            taxonomy: Taxonomy::default(),
            seek_step_s: 1.,
            seek_step_large_s: 5.,
            key_bindings: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, GazelineError> {
        Ok(dirs::config_dir()
            .ok_or(GazelineError::NoConfigDir)?
            .join("gazeline")
            .join(CONFIG_FILE_NAME))
    }

    /// Load from the user's config directory, defaults when there is no file
    pub fn from_local_file() -> Result<Self, GazelineError> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            debug!("No config file at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    pub fn from_file(config_path: &Path) -> Result<Self, GazelineError> {
        let file = std::fs::File::open(config_path)
            .map_err(|e| GazelineError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| GazelineError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), GazelineError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), GazelineError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GazelineError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| GazelineError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| GazelineError::ConfigSerializeError { source: e })
    }

    /// Configured bindings, validated against the taxonomy
    pub fn keymap(&self) -> Result<Keymap, GazelineError> {
        match &self.key_bindings {
            Some(bindings) => Keymap::from_bindings(bindings, self.taxonomy),
            None => Keymap::from_bindings(
                &default_bindings(self.taxonomy, self.seek_step_s, self.seek_step_large_s),
                self.taxonomy,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::keymap::KeyAction;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            taxonomy: Taxonomy::DoctorPatient,
            default_frame_rate: 25.,
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{ "taxonomy": "DoctorPatient" }"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.taxonomy, Taxonomy::DoctorPatient);
        assert_eq!(config.default_frame_rate, 30.);
        assert_eq!(config.refresh_rate_ms, REFRESH_RATE_MS);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(GazelineError::ConfigSerializeError { .. })
        ));
    }

    #[test]
    fn test_keymap_uses_seek_steps() {
        let config = AppConfig {
            seek_step_s: 2.,
            ..Default::default()
        };
        let keymap = config.keymap().unwrap();
        assert_eq!(keymap.action("right"), Some(&KeyAction::Seek { seconds: 2. }));
    }

    #[test]
    fn test_custom_bindings_are_validated() {
        let config = AppConfig {
            key_bindings: Some(vec![KeyBinding::new(
                "1",
                KeyAction::SetGaze {
                    subject: "doctor".to_string(),
                    label: crate::annotation::GazeLabel::Screen,
                },
            )]),
            ..Default::default()
        };
        // the default taxonomy has no doctor
        assert!(config.keymap().is_err());
    }
}

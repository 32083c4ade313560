// Static mapping from input keys to annotation actions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotation::{GazeLabel, Taxonomy, TrackKey};
use crate::errors::GazelineError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum KeyAction {
    TogglePlayback,
    /// Start or stop recording on a binary track
    ToggleRecording { track: TrackKey },
    /// Switch a subject to a gaze state
    SetGaze { subject: String, label: GazeLabel },
    /// Move the playback cursor by a relative number of seconds
    Seek { seconds: f64 },
    ClearTrack { track: TrackKey },
    ClearSubject { subject: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeyBinding {
    pub key: String,
    pub action: KeyAction,
}

impl KeyBinding {
    pub fn new(key: &str, action: KeyAction) -> Self {
        Self {
            key: key.to_string(),
            action,
        }
    }
}

/// Default bindings for a taxonomy
pub fn default_bindings(taxonomy: Taxonomy, seek_step_s: f64, seek_step_large_s: f64) -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::new("space", KeyAction::TogglePlayback),
        KeyBinding::new("left", KeyAction::Seek { seconds: -seek_step_s }),
        KeyBinding::new("right", KeyAction::Seek { seconds: seek_step_s }),
        KeyBinding::new(
            "shift+left",
            KeyAction::Seek {
                seconds: -seek_step_large_s,
            },
        ),
        KeyBinding::new(
            "shift+right",
            KeyAction::Seek {
                seconds: seek_step_large_s,
            },
        ),
    ];
    let set_gaze = |subject: &str, label| KeyAction::SetGaze {
        subject: subject.to_string(),
        label,
    };
    match taxonomy {
        Taxonomy::LeftRight => {
            bindings.push(KeyBinding::new(
                "l",
                KeyAction::ToggleRecording {
                    track: TrackKey::from("leftPersonGaze"),
                },
            ));
            bindings.push(KeyBinding::new(
                "r",
                KeyAction::ToggleRecording {
                    track: TrackKey::from("rightPersonGaze"),
                },
            ));
        }
        Taxonomy::DoctorPatient => {
            bindings.push(KeyBinding::new("1", set_gaze("doctor", GazeLabel::Person)));
            bindings.push(KeyBinding::new("2", set_gaze("doctor", GazeLabel::Screen)));
            bindings.push(KeyBinding::new("3", set_gaze("doctor", GazeLabel::Neither)));
            bindings.push(KeyBinding::new("4", set_gaze("patient", GazeLabel::Person)));
            bindings.push(KeyBinding::new("5", set_gaze("patient", GazeLabel::Neither)));
        }
    }
    bindings
}

/// Validated key table. Keys are matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct Keymap {
    actions: HashMap<String, KeyAction>,
}

impl Keymap {
    pub fn from_bindings(bindings: &[KeyBinding], taxonomy: Taxonomy) -> Result<Self, GazelineError> {
        let mut actions = HashMap::new();
        for binding in bindings {
            let key = normalize_key(&binding.key);
            let invalid = |reason: String| GazelineError::InvalidKeyBinding {
                key: binding.key.clone(),
                reason,
            };
            if key.is_empty() {
                return Err(invalid("key is empty".to_string()));
            }
            validate_action(&binding.action, taxonomy).map_err(&invalid)?;
            if actions.insert(key, binding.action.clone()).is_some() {
                return Err(invalid("key is bound more than once".to_string()));
            }
        }
        Ok(Self { actions })
    }

    pub fn action(&self, key: &str) -> Option<&KeyAction> {
        self.actions.get(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn validate_action(action: &KeyAction, taxonomy: Taxonomy) -> Result<(), String> {
    match action {
        KeyAction::TogglePlayback => Ok(()),
        KeyAction::ToggleRecording { track } | KeyAction::ClearTrack { track } => taxonomy
            .track(track)
            .map(|_| ())
            .ok_or_else(|| format!("unknown track {track} for {taxonomy:?}")),
        KeyAction::SetGaze { subject, label } => {
            let labels = taxonomy.labels_for(subject);
            if labels.is_empty() {
                Err(format!("unknown subject {subject} for {taxonomy:?}"))
            } else if !labels.contains(label) {
                Err(format!("{subject} cannot be set to {label:?}"))
            } else {
                Ok(())
            }
        }
        KeyAction::ClearSubject { subject } => {
            if taxonomy.subjects().contains(&subject.as_str()) {
                Ok(())
            } else {
                Err(format!("unknown subject {subject} for {taxonomy:?}"))
            }
        }
        KeyAction::Seek { seconds } => {
            if seconds.is_finite() && *seconds != 0. {
                Ok(())
            } else {
                Err(format!("seek step must be finite and non-zero, got {seconds}"))
            }
        }
    }
}

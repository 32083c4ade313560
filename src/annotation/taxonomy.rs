// Track keys and the subject/category axes a video is annotated on

use std::fmt;

use serde::{Deserialize, Serialize};

use super::interval::GazeLabel;

/// Wire name of a track in frame documents (e.g. `leftPersonGaze`)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackKey(String);

impl TrackKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One (subject, category) axis
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSpec {
    pub key: TrackKey,
    pub subject: &'static str,
    pub label: GazeLabel,
    /// Subject id used by machine-generated event logs
    pub human_id: u32,
    pub title: &'static str,
}

/// Which set of axes a video is annotated on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Taxonomy {
    /// Two people, each either looking at the other or not
    #[default]
    LeftRight,
    /// Doctor (person / screen / neither) and patient (person / neither)
    DoctorPatient,
}

impl Taxonomy {
    pub fn tracks(&self) -> Vec<TrackSpec> {
        match self {
            Taxonomy::LeftRight => vec![
                TrackSpec {
                    key: TrackKey::new("leftPersonGaze"),
                    subject: "left",
                    label: GazeLabel::Person,
                    human_id: 1,
                    title: "Person on left",
                },
                TrackSpec {
                    key: TrackKey::new("rightPersonGaze"),
                    subject: "right",
                    label: GazeLabel::Person,
                    human_id: 2,
                    title: "Person on right",
                },
            ],
            Taxonomy::DoctorPatient => vec![
                TrackSpec {
                    key: TrackKey::new("rightPersonGaze"),
                    subject: "doctor",
                    label: GazeLabel::Person,
                    human_id: 2,
                    title: "Doctor looking at patient",
                },
                TrackSpec {
                    key: TrackKey::new("rightPersonScreen"),
                    subject: "doctor",
                    label: GazeLabel::Screen,
                    human_id: 2,
                    title: "Doctor looking at screen",
                },
                TrackSpec {
                    key: TrackKey::new("leftPersonGaze"),
                    subject: "patient",
                    label: GazeLabel::Person,
                    human_id: 1,
                    title: "Patient looking at doctor",
                },
            ],
        }
    }

    pub fn track(&self, key: &TrackKey) -> Option<TrackSpec> {
        self.tracks().into_iter().find(|spec| &spec.key == key)
    }

    /// Subjects in first-seen order
    pub fn subjects(&self) -> Vec<&'static str> {
        let mut subjects = Vec::new();
        for spec in self.tracks() {
            if !subjects.contains(&spec.subject) {
                subjects.push(spec.subject);
            }
        }
        subjects
    }

    /// States a subject can be set to, `Neither` is always available
    pub fn labels_for(&self, subject: &str) -> Vec<GazeLabel> {
        let mut labels: Vec<GazeLabel> = self
            .tracks()
            .into_iter()
            .filter(|spec| spec.subject == subject)
            .map(|spec| spec.label)
            .collect();
        if !labels.is_empty() {
            labels.push(GazeLabel::Neither);
        }
        labels
    }
}

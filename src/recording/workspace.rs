// One annotation workspace per loaded video: cursor, sessions and imports

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::keymap::{KeyAction, Keymap};
use super::multi_state::MultiStateGazeSession;
use super::session::{RecordingSession, Transition};
use crate::annotation::{AnnotationSet, FrameAnnotations, GazeLabel, Interval, Taxonomy, TrackKey};
use crate::config::AppConfig;
use crate::errors::GazelineError;
use crate::evaluation::{AccuracyEvaluator, AccuracyReport};

/// Identifies one loaded video. Changes every time a video is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Handed out when an import starts, the result is only applied to the same session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportTicket {
    session: SessionId,
}

impl ImportTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }
}

/// Discrete inputs to a workspace, one line each in an event script.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum WorkspaceEvent {
    /// Position reported by the playing video, `elapsed_ms` is wall-clock time
    Playback { position: f64, elapsed_ms: u64 },
    /// User dragged the cursor on the timeline
    Scrub { position: f64 },
    Key { key: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    Moved { current_time: f64 },
    /// Playback sample arrived faster than the refresh cadence
    SampleDropped,
    PlaybackToggled { playing: bool },
    Recording { track: TrackKey, transition: Transition },
    GazeChanged { subject: String, closed: Option<Interval> },
    Cleared,
    /// Key has no binding
    Ignored,
}

/// Authoritative playback position, rate-limited for periodic samples.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackCursor {
    current_time: f64,
    duration: f64,
    playing: bool,
    refresh_rate_ms: u64,
    last_sample_ms: Option<u64>,
}

impl PlaybackCursor {
    pub fn new(duration: f64, refresh_rate_ms: u64) -> Self {
        Self {
            current_time: 0.,
            duration,
            playing: false,
            refresh_rate_ms,
            last_sample_ms: None,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn seek_to(&mut self, position: f64) -> f64 {
        if position.is_finite() {
            self.current_time = position.clamp(0., self.duration);
        }
        self.current_time
    }

    pub fn seek_by(&mut self, seconds: f64) -> f64 {
        self.seek_to(self.current_time + seconds)
    }

    /// Apply a playback sample unless one was applied less than the refresh
    /// rate ago. Returns whether the sample moved the cursor.
    pub fn sample(&mut self, position: f64, elapsed_ms: u64) -> bool {
        if let Some(last) = self.last_sample_ms {
            if elapsed_ms >= last && elapsed_ms - last < self.refresh_rate_ms {
                return false;
            }
        }
        self.last_sample_ms = Some(elapsed_ms);
        self.seek_to(position);
        true
    }
}

/// Manual annotation state for the loaded video.
///
/// Every key event is applied at the cursor's current time, so what gets
/// committed always matches where the cursor was when the event was processed.
pub struct AnnotationWorkspace {
    session: SessionId,
    taxonomy: Taxonomy,
    keymap: Keymap,
    default_frame_rate: f64,
    refresh_rate_ms: u64,
    annotations: AnnotationSet,
    cursor: PlaybackCursor,
    recorders: BTreeMap<TrackKey, RecordingSession>,
    gaze_sessions: BTreeMap<String, MultiStateGazeSession>,
    prediction: Option<FrameAnnotations>,
}

impl AnnotationWorkspace {
    /// Open a workspace on a video, `frame_rate` falls back to the configured default
    pub fn new(config: &AppConfig, duration: f64, frame_rate: Option<f64>) -> Result<Self, GazelineError> {
        let frame_rate = frame_rate.unwrap_or(config.default_frame_rate);
        let mut workspace = Self {
            session: SessionId(0),
            taxonomy: config.taxonomy,
            keymap: config.keymap()?,
            default_frame_rate: config.default_frame_rate,
            refresh_rate_ms: config.refresh_rate_ms,
            annotations: AnnotationSet::new(duration, frame_rate)?,
            cursor: PlaybackCursor::new(duration, config.refresh_rate_ms),
            recorders: BTreeMap::new(),
            gaze_sessions: BTreeMap::new(),
            prediction: None,
        };
        workspace.reset_sessions();
        Ok(workspace)
    }

    /// Replace the video. All tracks, sessions and the prediction are dropped
    /// and imports started before this call are ignored.
    pub fn load_video(&mut self, duration: f64, frame_rate: Option<f64>) -> Result<SessionId, GazelineError> {
        let frame_rate = frame_rate.unwrap_or(self.default_frame_rate);
        self.annotations = AnnotationSet::new(duration, frame_rate)?;
        self.cursor = PlaybackCursor::new(duration, self.refresh_rate_ms);
        self.prediction = None;
        self.session = SessionId(self.session.0 + 1);
        self.reset_sessions();
        info!("Loaded video of {duration}s at {frame_rate} fps as {:?}", self.session);
        Ok(self.session)
    }

    fn reset_sessions(&mut self) {
        self.recorders.clear();
        self.gaze_sessions.clear();
        for spec in self.taxonomy.tracks() {
            self.annotations.track_mut(&spec.key);
            self.recorders.insert(spec.key, RecordingSession::new());
        }
        for subject in self.taxonomy.subjects() {
            self.annotations.subject_track_mut(subject);
            self.gaze_sessions
                .insert(subject.to_string(), MultiStateGazeSession::new());
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn prediction(&self) -> Option<&FrameAnnotations> {
        self.prediction.as_ref()
    }

    pub fn recording(&self, track: &TrackKey) -> Option<&RecordingSession> {
        self.recorders.get(track)
    }

    pub fn gaze_session(&self, subject: &str) -> Option<&MultiStateGazeSession> {
        self.gaze_sessions.get(subject)
    }

    pub fn handle(&mut self, event: &WorkspaceEvent) -> Result<EventOutcome, GazelineError> {
        match event {
            WorkspaceEvent::Playback {
                position,
                elapsed_ms,
            } => {
                if self.cursor.sample(*position, *elapsed_ms) {
                    Ok(EventOutcome::Moved {
                        current_time: self.cursor.current_time(),
                    })
                } else {
                    Ok(EventOutcome::SampleDropped)
                }
            }
            WorkspaceEvent::Scrub { position } => Ok(EventOutcome::Moved {
                current_time: self.cursor.seek_to(*position),
            }),
            WorkspaceEvent::Key { key } => match self.keymap.action(key).cloned() {
                Some(action) => self.perform(&action),
                None => {
                    debug!("No binding for key {key}");
                    Ok(EventOutcome::Ignored)
                }
            },
        }
    }

    pub fn perform(&mut self, action: &KeyAction) -> Result<EventOutcome, GazelineError> {
        match action {
            KeyAction::TogglePlayback => Ok(EventOutcome::PlaybackToggled {
                playing: self.cursor.toggle_playback(),
            }),
            KeyAction::Seek { seconds } => Ok(EventOutcome::Moved {
                current_time: self.cursor.seek_by(*seconds),
            }),
            KeyAction::ToggleRecording { track } => Ok(EventOutcome::Recording {
                track: track.clone(),
                transition: self.toggle_recording(track)?,
            }),
            KeyAction::SetGaze { subject, label } => Ok(EventOutcome::GazeChanged {
                subject: subject.clone(),
                closed: self.set_gaze(subject, *label)?,
            }),
            KeyAction::ClearTrack { track } => {
                self.clear_track(track)?;
                Ok(EventOutcome::Cleared)
            }
            KeyAction::ClearSubject { subject } => {
                self.clear_subject(subject)?;
                Ok(EventOutcome::Cleared)
            }
        }
    }

    pub fn toggle_recording(&mut self, track: &TrackKey) -> Result<Transition, GazelineError> {
        let time = self.cursor.current_time();
        let recorder = self
            .recorders
            .get_mut(track)
            .ok_or_else(|| GazelineError::UnknownTrack {
                key: track.to_string(),
            })?;
        Ok(recorder.toggle(self.annotations.track_mut(track), time))
    }

    pub fn set_gaze(&mut self, subject: &str, label: GazeLabel) -> Result<Option<Interval>, GazelineError> {
        let time = self.cursor.current_time();
        let session = self
            .gaze_sessions
            .get_mut(subject)
            .ok_or_else(|| GazelineError::UnknownTrack {
                key: subject.to_string(),
            })?;
        Ok(session.set_state(self.annotations.subject_track_mut(subject), label, time))
    }

    pub fn clear_track(&mut self, track: &TrackKey) -> Result<(), GazelineError> {
        let recorder = self
            .recorders
            .get_mut(track)
            .ok_or_else(|| GazelineError::UnknownTrack {
                key: track.to_string(),
            })?;
        recorder.clear(self.annotations.track_mut(track));
        Ok(())
    }

    pub fn clear_subject(&mut self, subject: &str) -> Result<(), GazelineError> {
        let session = self
            .gaze_sessions
            .get_mut(subject)
            .ok_or_else(|| GazelineError::UnknownTrack {
                key: subject.to_string(),
            })?;
        session.clear(self.annotations.subject_track_mut(subject));
        Ok(())
    }

    /// Close every open gaze state at the end of the video
    pub fn finish(&mut self) -> Vec<Interval> {
        let end = self.annotations.duration();
        let mut closed = Vec::new();
        for (subject, session) in self.gaze_sessions.iter_mut() {
            if let Some(interval) = session.finish(self.annotations.subject_track_mut(subject), end) {
                closed.push(interval);
            }
        }
        closed
    }

    /// Frame-domain view of the manual annotations, as exported
    pub fn export(&self) -> FrameAnnotations {
        self.annotations.to_frame_annotations(self.taxonomy)
    }

    pub fn begin_import(&self) -> ImportTicket {
        ImportTicket {
            session: self.session,
        }
    }

    /// Apply a finished import. Results for another video are discarded and a
    /// failed import leaves the current prediction untouched.
    pub fn apply_import(
        &mut self,
        ticket: ImportTicket,
        result: Result<FrameAnnotations, GazelineError>,
    ) -> Result<bool, GazelineError> {
        if ticket.session != self.session {
            warn!(
                "Discarding import started for {:?}, current video is {:?}",
                ticket.session, self.session
            );
            return Ok(false);
        }
        self.prediction = Some(result?);
        Ok(true)
    }

    /// Score the imported prediction against the manual annotations
    pub fn evaluate(&self) -> Option<AccuracyReport> {
        let prediction = self.prediction.as_ref()?;
        AccuracyEvaluator::new(self.taxonomy).evaluate(&self.export(), prediction)
    }
}

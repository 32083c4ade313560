// All annotation tracks for one video, in time and frame domain

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::interval::{FrameSpan, GazeLabel, Interval};
use super::taxonomy::{Taxonomy, TrackKey};
use super::track::Track;
use crate::errors::GazelineError;

pub const DEFAULT_FRAME_RATE: f64 = 30.;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub duration: f64,
    pub frame_rate: f64,
    /// Derived from duration and frame rate when absent from a document
    #[serde(default)]
    pub total_frames: u64,
}

impl VideoInfo {
    pub fn new(duration: f64, frame_rate: f64) -> Result<Self, GazelineError> {
        if !(frame_rate.is_finite() && frame_rate > 0.) {
            return Err(GazelineError::InvalidVideoInfo {
                reason: format!("frame rate must be positive, got {frame_rate}"),
            });
        }
        if !(duration.is_finite() && duration >= 0.) {
            return Err(GazelineError::InvalidVideoInfo {
                reason: format!("duration must be non-negative, got {duration}"),
            });
        }
        Ok(Self {
            duration,
            frame_rate,
            total_frames: (duration * frame_rate).round() as u64,
        })
    }

    /// Whether frame-based comparisons can be made against this video
    pub fn is_measurable(&self) -> bool {
        self.frame_rate.is_finite()
            && self.frame_rate > 0.
            && self.duration.is_finite()
            && self.duration > 0.
            && self.total_frames > 0
    }
}

/// Frame-domain annotations as they are imported and exported.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameAnnotations {
    pub video_info: VideoInfo,
    pub tracks: BTreeMap<TrackKey, Vec<FrameSpan>>,
}

impl FrameAnnotations {
    pub fn new(video_info: VideoInfo) -> Self {
        Self {
            video_info,
            tracks: BTreeMap::new(),
        }
    }

    pub fn spans(&self, key: &TrackKey) -> &[FrameSpan] {
        self.tracks.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Seconds-based view of the spans as labeled subject tracks.
    ///
    /// Each axis contributes its label to its subject's track, and the time
    /// no axis covers becomes `Neither`. Spans overlapping an interval already
    /// placed on the subject are skipped.
    pub fn to_annotation_set(&self, taxonomy: Taxonomy) -> Result<AnnotationSet, GazelineError> {
        let VideoInfo {
            duration,
            frame_rate,
            ..
        } = self.video_info;
        let mut set = AnnotationSet::new(duration, frame_rate)?;
        for spec in taxonomy.tracks() {
            let track = set.subject_track_mut(spec.subject);
            for span in self.spans(&spec.key) {
                let Some(interval) = span.to_interval(frame_rate, duration) else {
                    continue;
                };
                if track.has_conflict(interval.start, Some(interval.end)) {
                    debug!("Skipping {span:?} of {}, {} is already labeled there", spec.key, spec.subject);
                    continue;
                }
                track.insert(interval.with_label(spec.label));
            }
        }
        for subject in taxonomy.subjects() {
            let track = set.subject_track_mut(subject);
            for gap in track.gaps(duration) {
                track.insert(gap.with_label(GazeLabel::Neither));
            }
        }
        Ok(set)
    }
}

/// Manual annotations for one video.
///
/// Binary tracks hold one (subject, category) axis each and are filled by
/// recording sessions. Subject tracks hold labeled intervals for a subject
/// switching between gaze states.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationSet {
    video_info: VideoInfo,
    tracks: BTreeMap<TrackKey, Track>,
    subject_tracks: BTreeMap<String, Track>,
}

impl AnnotationSet {
    pub fn new(duration: f64, frame_rate: f64) -> Result<Self, GazelineError> {
        Ok(Self {
            video_info: VideoInfo::new(duration, frame_rate)?,
            tracks: BTreeMap::new(),
            subject_tracks: BTreeMap::new(),
        })
    }

    pub fn video_info(&self) -> &VideoInfo {
        &self.video_info
    }

    pub fn duration(&self) -> f64 {
        self.video_info.duration
    }

    pub fn frame_rate(&self) -> f64 {
        self.video_info.frame_rate
    }

    pub fn track(&self, key: &TrackKey) -> Option<&Track> {
        self.tracks.get(key)
    }

    pub fn track_mut(&mut self, key: &TrackKey) -> &mut Track {
        self.tracks.entry(key.clone()).or_default()
    }

    pub fn tracks(&self) -> impl Iterator<Item = (&TrackKey, &Track)> {
        self.tracks.iter()
    }

    pub fn subject_track(&self, subject: &str) -> Option<&Track> {
        self.subject_tracks.get(subject)
    }

    pub fn subject_track_mut(&mut self, subject: &str) -> &mut Track {
        self.subject_tracks.entry(subject.to_string()).or_default()
    }

    pub fn subject_tracks(&self) -> impl Iterator<Item = (&String, &Track)> {
        self.subject_tracks.iter()
    }

    pub fn clear(&mut self) {
        self.tracks.values_mut().for_each(Track::clear);
        self.subject_tracks.values_mut().for_each(Track::clear);
    }

    /// Project every track onto the frame grid.
    ///
    /// Each taxonomy axis receives its binary track plus the intervals of its
    /// subject's labeled track carrying the axis label. Ends are clamped to the
    /// video duration and spans shorter than a frame are dropped.
    pub fn to_frame_annotations(&self, taxonomy: Taxonomy) -> FrameAnnotations {
        let frame_rate = self.video_info.frame_rate;
        let mut intervals: BTreeMap<TrackKey, Vec<Interval>> = BTreeMap::new();

        for spec in taxonomy.tracks() {
            let axis = intervals.entry(spec.key.clone()).or_default();
            if let Some(subject_track) = self.subject_tracks.get(spec.subject) {
                axis.extend(
                    subject_track
                        .intervals()
                        .iter()
                        .filter(|interval| interval.label == Some(spec.label)),
                );
            }
        }
        for (key, track) in &self.tracks {
            intervals
                .entry(key.clone())
                .or_default()
                .extend(track.intervals());
        }

        let mut annotations = FrameAnnotations::new(self.video_info);
        for (key, mut axis) in intervals {
            axis.sort_by(|a, b| a.start.total_cmp(&b.start));
            let spans: Vec<FrameSpan> = axis
                .iter()
                .filter_map(|interval| {
                    let clamped = Interval::new(interval.start, interval.end.min(self.duration()));
                    clamped.ok().map(|clamped| clamped.to_frames(frame_rate))
                })
                .filter(|span| {
                    if span.is_empty() {
                        debug!("Dropping sub-frame interval from {key}");
                    }
                    !span.is_empty()
                })
                .collect();
            annotations.tracks.insert(key, spans);
        }
        annotations
    }

    /// Share of the video duration, in percent, spent in each label by a subject
    pub fn label_percentages(&self, subject: &str) -> Option<BTreeMap<GazeLabel, f64>> {
        if self.video_info.duration <= 0. {
            return None;
        }
        let track = self.subject_tracks.get(subject)?;
        Some(
            GazeLabel::ALL
                .iter()
                .map(|label| {
                    (
                        *label,
                        track.labeled_time(*label) * 100. / self.video_info.duration,
                    )
                })
                .collect(),
        )
    }
}

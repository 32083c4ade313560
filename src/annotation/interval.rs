// Core value types for gaze annotations

use serde::{Deserialize, Serialize};

use crate::errors::GazelineError;

/// Mutually exclusive gaze states a subject can be in.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GazeLabel {
    /// Looking at the other person
    Person,
    /// Looking at a screen
    Screen,
    /// Looking at neither
    Neither,
}

impl GazeLabel {
    pub const ALL: [GazeLabel; 3] = [GazeLabel::Person, GazeLabel::Screen, GazeLabel::Neither];

    /// Value of the `contact` field that means "looking at this target" in an
    /// event log. `Neither` has no target.
    pub fn contact_target(&self) -> Option<&'static str> {
        match self {
            GazeLabel::Person => Some("human"),
            GazeLabel::Screen => Some("screen"),
            GazeLabel::Neither => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GazeLabel::Person => "Looking at person",
            GazeLabel::Screen => "Looking at screen",
            GazeLabel::Neither => "Looking at neither",
        }
    }
}

/// A closed span of video time in seconds, optionally tagged with a gaze label.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub label: Option<GazeLabel>,
}

impl Interval {
    /// Create an unlabeled interval, requires `0 <= start < end`
    pub fn new(start: f64, end: f64) -> Result<Self, GazelineError> {
        if !(start >= 0.0 && start < end) || !end.is_finite() {
            return Err(GazelineError::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            label: None,
        })
    }

    pub fn labeled(start: f64, end: f64, label: GazeLabel) -> Result<Self, GazelineError> {
        Ok(Self::new(start, end)?.with_label(label))
    }

    pub fn with_label(mut self, label: GazeLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// Inclusive point membership, a point sitting on either boundary is inside
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Open-interval overlap, touching endpoints do not overlap
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        start < self.end && end > self.start
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Snap this interval onto the frame grid
    pub fn to_frames(&self, frame_rate: f64) -> FrameSpan {
        FrameSpan {
            start_frame: time_to_frame(self.start, frame_rate),
            end_frame: time_to_frame(self.end, frame_rate),
        }
    }
}

/// A half-open run of video frames `[start_frame, end_frame)`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSpan {
    pub start_frame: u64,
    pub end_frame: u64,
}

impl FrameSpan {
    pub fn new(start_frame: u64, end_frame: u64) -> Self {
        Self {
            start_frame,
            end_frame,
        }
    }

    pub fn len(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Back to seconds, with the end clamped to `duration`
    pub fn to_interval(&self, frame_rate: f64, duration: f64) -> Option<Interval> {
        let start = frame_to_time(self.start_frame, frame_rate);
        let end = frame_to_time(self.end_frame, frame_rate).min(duration);
        Interval::new(start, end).ok()
    }
}

/// `frame = round(time * frame_rate)`, negative times snap to frame 0
pub fn time_to_frame(time: f64, frame_rate: f64) -> u64 {
    (time * frame_rate).round().max(0.) as u64
}

/// `time = frame / frame_rate`
pub fn frame_to_time(frame: u64, frame_rate: f64) -> f64 {
    frame as f64 / frame_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(0.0, 1.0).is_ok());
        assert!(Interval::new(-0.5, 1.0).is_err());
        assert!(Interval::new(2.0, 2.0).is_err());
        assert!(Interval::new(3.0, 2.0).is_err());
        assert!(Interval::new(f64::NAN, 2.0).is_err());
    }

    #[test]
    fn test_point_membership_is_inclusive() {
        let interval = Interval::new(5.0, 10.0).unwrap();
        assert!(interval.contains(5.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(7.5));
        assert!(!interval.contains(10.01));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let interval = Interval::new(5.0, 10.0).unwrap();
        assert!(!interval.overlaps(10.0, 12.0));
        assert!(!interval.overlaps(1.0, 5.0));
        assert!(interval.overlaps(9.99, 12.0));
        assert!(interval.overlaps(6.0, 7.0));
    }

    #[test]
    fn test_frame_conversion() {
        assert_eq!(time_to_frame(2.0, 30.0), 60);
        assert_eq!(time_to_frame(1.0 / 60.0, 30.0), 1);
        assert_eq!(frame_to_time(90, 30.0), 3.0);

        let span = Interval::new(2.0, 4.0).unwrap().to_frames(30.0);
        assert_eq!(span, FrameSpan::new(60, 120));
        assert_eq!(span.len(), 60);
    }

    #[test]
    fn test_frame_span_to_interval_clamps_to_duration() {
        let interval = FrameSpan::new(60, 400).to_interval(30.0, 10.0).unwrap();
        assert_eq!(interval.start, 2.0);
        assert_eq!(interval.end, 10.0);
        assert!(FrameSpan::new(10, 10).to_interval(30.0, 10.0).is_none());
    }
}

// Gaze state switching for subjects with more than two states

use log::debug;

use crate::annotation::{GazeLabel, Interval, Track};

/// Tracks the open interval of a subject that is always in exactly one state.
///
/// Selecting a new state closes the open interval and inserts it into the
/// bound track. After the cursor was scrubbed back, a closed interval that
/// overlaps an earlier one is dropped. There is no stop event: the last interval stays open until
/// [`MultiStateGazeSession::finish`] is called.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiStateGazeSession {
    current_state: Option<GazeLabel>,
    state_start_time: Option<f64>,
}

impl MultiStateGazeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> Option<GazeLabel> {
        self.current_state
    }

    pub fn state_start_time(&self) -> Option<f64> {
        self.state_start_time
    }

    /// Switch to `label` at `time`, returning the interval that was closed
    pub fn set_state(&mut self, track: &mut Track, label: GazeLabel, time: f64) -> Option<Interval> {
        if self.current_state == Some(label) {
            return None;
        }
        let committed = self.commit(track, time);
        self.current_state = Some(label);
        self.state_start_time = Some(time);
        committed
    }

    /// Close the open interval at `end_time`, e.g. the video duration before export
    pub fn finish(&mut self, track: &mut Track, end_time: f64) -> Option<Interval> {
        let committed = self.commit(track, end_time);
        self.current_state = None;
        self.state_start_time = None;
        committed
    }

    pub fn clear(&mut self, track: &mut Track) {
        track.clear();
        self.current_state = None;
        self.state_start_time = None;
    }

    fn commit(&self, track: &mut Track, time: f64) -> Option<Interval> {
        let (Some(start), Some(label)) = (self.state_start_time, self.current_state) else {
            return None;
        };
        match Interval::labeled(start, time, label) {
            Ok(interval) if track.has_conflict(start, Some(time)) => {
                debug!("Not committing {interval:?}, it overlaps an earlier state");
                None
            }
            Ok(interval) => {
                track.insert(interval);
                Some(interval)
            }
            Err(e) => {
                debug!("Not committing {label:?} state: {e}");
                None
            }
        }
    }
}

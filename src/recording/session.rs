// Start/stop recording of binary gaze intervals on a single track

use log::debug;

use crate::annotation::{Interval, Track};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording { pending_start: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordingEvent {
    Toggle { current_time: f64 },
    Clear,
}

/// What a processed event did to the session and its track
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// Recording started at `start`
    Armed { start: f64 },
    /// Start refused, the cursor sits inside an existing interval
    Blocked,
    /// Recording stopped and the interval must be inserted into the track
    Committed(Interval),
    /// Recording stopped on an empty or conflicting span, nothing to insert
    Discarded,
    /// The track must be emptied
    Cleared,
}

/// Pure transition function of the recording state machine.
///
/// The track is only inspected; applying a `Committed` or `Cleared` transition
/// is left to the caller.
pub fn reduce(
    state: RecordingState,
    track: &Track,
    event: RecordingEvent,
) -> (RecordingState, Transition) {
    match (state, event) {
        (_, RecordingEvent::Clear) => (RecordingState::Idle, Transition::Cleared),
        (RecordingState::Idle, RecordingEvent::Toggle { current_time }) => {
            if track.has_conflict(current_time, None) {
                (RecordingState::Idle, Transition::Blocked)
            } else {
                (
                    RecordingState::Recording {
                        pending_start: current_time,
                    },
                    Transition::Armed {
                        start: current_time,
                    },
                )
            }
        }
        (RecordingState::Recording { pending_start }, RecordingEvent::Toggle { current_time }) => {
            let transition = if pending_start < current_time
                && !track.has_conflict(pending_start, Some(current_time))
            {
                Interval::new(pending_start, current_time)
                    .map(Transition::Committed)
                    .unwrap_or(Transition::Discarded)
            } else {
                Transition::Discarded
            };
            (RecordingState::Idle, transition)
        }
    }
}

/// Recording session bound to one track by its owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSession {
    state: RecordingState,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// The "armed" flag shown to the user, only set while a start is pending
    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecordingState::Recording { .. })
    }

    pub fn pending_start(&self) -> Option<f64> {
        match self.state {
            RecordingState::Recording { pending_start } => Some(pending_start),
            RecordingState::Idle => None,
        }
    }

    pub fn toggle(&mut self, track: &mut Track, current_time: f64) -> Transition {
        self.apply(track, RecordingEvent::Toggle { current_time })
    }

    pub fn clear(&mut self, track: &mut Track) {
        self.apply(track, RecordingEvent::Clear);
    }

    fn apply(&mut self, track: &mut Track, event: RecordingEvent) -> Transition {
        let (state, transition) = reduce(self.state, track, event);
        self.state = state;
        match transition {
            Transition::Committed(interval) => track.insert(interval),
            Transition::Cleared => track.clear(),
            Transition::Blocked => debug!("Recording not started, {event:?} lands in an interval"),
            Transition::Discarded => debug!("Dropped empty or conflicting recording on {event:?}"),
            Transition::Armed { .. } => {}
        }
        transition
    }
}

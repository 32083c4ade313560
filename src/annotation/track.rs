// Ordered interval store for one subject/category axis

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Intervals for a single axis, sorted by start.
///
/// The store does not reject overlaps on insert. Callers check
/// [`Track::has_conflict`] first and decide what to do with a conflict.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Track {
    intervals: Vec<Interval>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// With `end_time` unset this is an inclusive point test, otherwise an
    /// open-interval overlap test.
    pub fn has_conflict(&self, start_time: f64, end_time: Option<f64>) -> bool {
        self.intervals.iter().any(|interval| match end_time {
            None => interval.contains(start_time),
            Some(end_time) => interval.overlaps(start_time, end_time),
        })
    }

    /// Insert before the first interval starting strictly later, so ties keep
    /// the new interval after existing ones with an equal start.
    pub fn insert(&mut self, interval: Interval) {
        let index = self
            .intervals
            .iter()
            .position(|existing| existing.start > interval.start)
            .unwrap_or(self.intervals.len());
        self.intervals.insert(index, interval);
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn gaps(&self, duration: f64) -> Vec<Interval> {
        gap_fill(&self.intervals, duration)
    }

    /// Total seconds covered by intervals carrying `label`
    pub fn labeled_time(&self, label: super::GazeLabel) -> f64 {
        self.intervals
            .iter()
            .filter(|interval| interval.label == Some(label))
            .fold(0.0, |total, interval| total + interval.length())
    }
}

/// Unlabeled spans of `[0, duration]` not covered by any interval
pub fn gap_fill(intervals: &[Interval], duration: f64) -> Vec<Interval> {
    let mut gaps = Vec::new();
    let mut last_end = 0.0_f64;
    for interval in intervals
        .iter()
        .sorted_by(|a, b| a.start.total_cmp(&b.start))
    {
        if interval.start > last_end {
            if let Ok(gap) = Interval::new(last_end, interval.start) {
                gaps.push(gap);
            }
        }
        last_end = last_end.max(interval.end);
    }
    if last_end < duration {
        if let Ok(gap) = Interval::new(last_end, duration) {
            gaps.push(gap);
        }
    }
    gaps
}

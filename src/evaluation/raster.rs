// Per-frame rasterization of interval sets

use itertools::Itertools;

use crate::annotation::{FrameSpan, Interval};

/// One cell per video frame. Derived from intervals, never edited directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameArray<T> {
    cells: Vec<T>,
}

impl<T: Clone> FrameArray<T> {
    pub fn filled(total_frames: usize, value: T) -> Self {
        Self {
            cells: vec![value; total_frames],
        }
    }

    /// Set every frame of `span` to `value`, spans running past the end are cut
    fn mark(&mut self, span: FrameSpan, value: T) {
        let end = (span.end_frame as usize).min(self.cells.len());
        let start = (span.start_frame as usize).min(end);
        self.cells[start..end].fill(value);
    }
}

impl<T> FrameArray<T> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }
}

/// Mark frame-domain spans as they are stored, later spans win on overlap
pub fn rasterize_spans(spans: &[FrameSpan], total_frames: usize) -> FrameArray<bool> {
    let mut frames = FrameArray::filled(total_frames, false);
    for span in spans {
        frames.mark(*span, true);
    }
    frames
}

/// Mark seconds-based intervals after snapping them to the frame grid.
/// Returns `None` for an unusable frame rate.
pub fn rasterize(intervals: &[Interval], total_frames: usize, frame_rate: f64) -> Option<FrameArray<bool>> {
    if !(frame_rate.is_finite() && frame_rate > 0.) {
        return None;
    }
    let spans: Vec<FrameSpan> = intervals
        .iter()
        .map(|interval| interval.to_frames(frame_rate))
        .collect();
    Some(rasterize_spans(&spans, total_frames))
}

/// Reconstruct the runs of marked frames
pub fn runs(frames: &FrameArray<bool>) -> Vec<FrameSpan> {
    let chunks = frames.iter().enumerate().chunk_by(|(_, marked)| **marked);
    let mut spans = Vec::new();
    for (marked, mut run) in &chunks {
        if !marked {
            continue;
        }
        if let Some((first, _)) = run.next() {
            let last = run.last().map(|(index, _)| index).unwrap_or(first);
            spans.push(FrameSpan::new(first as u64, last as u64 + 1));
        }
    }
    spans
}

// Annotation model: intervals, tracks and the per-video annotation set

pub mod interval;
pub mod set;
pub mod taxonomy;
pub mod track;

// Re-export commonly used types
pub use interval::{FrameSpan, GazeLabel, Interval, frame_to_time, time_to_frame};
pub use set::{AnnotationSet, DEFAULT_FRAME_RATE, FrameAnnotations, VideoInfo};
pub use taxonomy::{Taxonomy, TrackKey, TrackSpec};
pub use track::{Track, gap_fill};

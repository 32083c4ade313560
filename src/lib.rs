// Library interface for gazeline
// The binary and the integration tests both go through these modules

pub mod annotation;
pub mod codec;
pub mod config;
pub mod errors;
pub mod evaluation;
pub mod recording;

// Re-export commonly used types
pub use annotation::{AnnotationSet, FrameAnnotations, FrameSpan, GazeLabel, Interval, Taxonomy, TrackKey};
pub use codec::{AnnotationCodec, DecodeContext};
pub use config::AppConfig;
pub use errors::GazelineError;
pub use evaluation::{AccuracyEvaluator, AccuracyReport};
pub use recording::{AnnotationWorkspace, WorkspaceEvent};

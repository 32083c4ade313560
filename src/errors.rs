// Error types for gazeline

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum GazelineError {
    // Annotation model errors
    #[snafu(display("Invalid interval: start {start} must be >= 0 and before end {end}"))]
    InvalidInterval { start: f64, end: f64 },
    #[snafu(display("Invalid video info: {reason}"))]
    InvalidVideoInfo { reason: String },
    #[snafu(display("Unknown track: {key}"))]
    UnknownTrack { key: String },

    // Evaluation errors
    #[snafu(display("Frame arrays differ in length: expected {expected}, got {actual}"))]
    FrameCountMismatch { expected: usize, actual: usize },

    // Import / export errors
    #[snafu(display("Unrecognized annotation format: {reason}"))]
    UnrecognizedAnnotationFormat { reason: String },
    #[snafu(display("Error writing annotation file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing annotation file"))]
    SerializeError { source: serde_json::Error },
    #[snafu(display("Error loading annotation file"))]
    AnnotationLoaderError { source: io::Error },
    #[snafu(display("Annotation import task failed: {reason}"))]
    ImportTaskError { reason: String },
    #[snafu(display("Invalid event script: {path}"))]
    InvalidEventScript { path: String },
    #[snafu(display("Error reading event script"))]
    EventScriptError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error accessing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display("Invalid key binding '{key}': {reason}"))]
    InvalidKeyBinding { key: String, reason: String },
}

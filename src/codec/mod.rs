// Import and export of annotation documents
// Formats are recognized by their structure; new shapes are added as adapters

pub mod event_log;
pub mod frame_document;
pub mod loader;
pub mod writer;

use log::{debug, info};
use serde_json::Value;

use crate::annotation::{DEFAULT_FRAME_RATE, FrameAnnotations, Taxonomy, VideoInfo};
use crate::errors::GazelineError;

pub use event_log::EventLogFormat;
pub use frame_document::{FrameDocument, FrameDocumentFormat};
pub use loader::{load_annotations, load_annotations_async};
pub use writer::write_annotations;

/// What a decoder needs to know that a document may not carry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeContext {
    pub frame_rate: f64,
    pub duration: Option<f64>,
    pub taxonomy: Taxonomy,
}

impl DecodeContext {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            duration: None,
            taxonomy,
        }
    }

    /// Keep the default frame rate when none could be discovered
    pub fn with_frame_rate(mut self, frame_rate: Option<f64>) -> Self {
        if let Some(frame_rate) = frame_rate {
            self.frame_rate = frame_rate;
        }
        self
    }

    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    /// Video info for documents without their own, ending at `last_frame`
    /// unless a duration is known
    pub fn fallback_video_info(&self, last_frame: u64) -> VideoInfo {
        let duration = self
            .duration
            .unwrap_or(last_frame as f64 / self.frame_rate);
        VideoInfo {
            duration,
            frame_rate: self.frame_rate,
            total_frames: (duration * self.frame_rate).round().max(0.) as u64,
        }
    }
}

/// One recognizable document shape.
pub trait AnnotationFormat: Send + Sync {
    fn name(&self) -> &'static str;

    /// Structural test, no version tags involved
    fn matches(&self, document: &Value) -> bool;

    fn decode(
        &self,
        document: &Value,
        context: &DecodeContext,
    ) -> Result<FrameAnnotations, GazelineError>;
}

/// Ordered list of formats, the first match decodes the document.
pub struct AnnotationCodec {
    formats: Vec<Box<dyn AnnotationFormat>>,
}

impl Default for AnnotationCodec {
    fn default() -> Self {
        Self::empty()
            .with_format(FrameDocumentFormat)
            .with_format(EventLogFormat)
    }
}

impl AnnotationCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: impl AnnotationFormat + 'static) -> Self {
        self.formats.push(Box::new(format));
        self
    }

    pub fn decode_str(
        &self,
        text: &str,
        context: &DecodeContext,
    ) -> Result<FrameAnnotations, GazelineError> {
        let document: Value = serde_json::from_str(text).map_err(|e| {
            GazelineError::UnrecognizedAnnotationFormat {
                reason: format!("not a JSON document: {e}"),
            }
        })?;
        self.decode(&document, context)
    }

    pub fn decode(
        &self,
        document: &Value,
        context: &DecodeContext,
    ) -> Result<FrameAnnotations, GazelineError> {
        let format = self
            .formats
            .iter()
            .find(|format| format.matches(document))
            .ok_or_else(|| GazelineError::UnrecognizedAnnotationFormat {
                reason: "neither a frame document nor a gaze event log".to_string(),
            })?;
        debug!("Decoding annotations as {}", format.name());
        let annotations = format.decode(document, context)?;
        info!(
            "Decoded {} tracks with {} spans from {}",
            annotations.tracks.len(),
            annotations.tracks.values().map(Vec::len).sum::<usize>(),
            format.name()
        );
        Ok(annotations)
    }

    /// Canonical frame document for export
    pub fn encode(annotations: &FrameAnnotations) -> FrameDocument {
        FrameDocument::from(annotations)
    }

    pub fn encode_string(annotations: &FrameAnnotations) -> Result<String, GazelineError> {
        serde_json::to_string_pretty(&Self::encode(annotations))
            .map_err(|e| GazelineError::SerializeError { source: e })
    }
}

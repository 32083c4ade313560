// Frame-domain documents carrying `manualAnnotations` directly

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AnnotationFormat, DecodeContext};
use crate::annotation::{FrameAnnotations, FrameSpan, TrackKey, VideoInfo};
use crate::errors::GazelineError;

const ANNOTATIONS_FIELD: &str = "manualAnnotations";

/// Canonical import/export schema
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameDocument {
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
    pub manual_annotations: BTreeMap<TrackKey, Vec<FrameSpan>>,
}

impl From<&FrameAnnotations> for FrameDocument {
    fn from(annotations: &FrameAnnotations) -> Self {
        Self {
            video_info: Some(annotations.video_info),
            manual_annotations: annotations.tracks.clone(),
        }
    }
}

/// Accepts the document as an object, or an array holding such an object
/// next to other entries (e.g. a percentages summary row).
pub struct FrameDocumentFormat;

impl FrameDocumentFormat {
    fn annotation_entry(document: &Value) -> Option<&Value> {
        match document {
            Value::Object(map) if map.contains_key(ANNOTATIONS_FIELD) => Some(document),
            Value::Array(entries) => entries
                .iter()
                .find(|entry| entry.get(ANNOTATIONS_FIELD).is_some()),
            _ => None,
        }
    }
}

impl AnnotationFormat for FrameDocumentFormat {
    fn name(&self) -> &'static str {
        "frame document"
    }

    fn matches(&self, document: &Value) -> bool {
        Self::annotation_entry(document).is_some()
    }

    fn decode(
        &self,
        document: &Value,
        context: &DecodeContext,
    ) -> Result<FrameAnnotations, GazelineError> {
        let entry = Self::annotation_entry(document).ok_or_else(|| {
            GazelineError::UnrecognizedAnnotationFormat {
                reason: format!("no {ANNOTATIONS_FIELD} entry"),
            }
        })?;
        let parsed: FrameDocument = serde_json::from_value(entry.clone()).map_err(|e| {
            GazelineError::UnrecognizedAnnotationFormat {
                reason: format!("malformed {ANNOTATIONS_FIELD}: {e}"),
            }
        })?;

        let video_info = match parsed.video_info {
            Some(stored) => {
                let info = VideoInfo::new(stored.duration, stored.frame_rate)?;
                if stored.total_frames != 0 && stored.total_frames != info.total_frames {
                    warn!(
                        "Ignoring totalFrames {}, {}s at {} fps is {} frames",
                        stored.total_frames, info.duration, info.frame_rate, info.total_frames
                    );
                }
                info
            }
            None => {
                let last_frame = parsed
                    .manual_annotations
                    .values()
                    .flatten()
                    .map(|span| span.end_frame)
                    .max()
                    .unwrap_or(0);
                context.fallback_video_info(last_frame)
            }
        };

        Ok(FrameAnnotations {
            video_info,
            tracks: parsed.manual_annotations,
        })
    }
}

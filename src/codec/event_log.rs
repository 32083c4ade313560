// Flat logs of frame-indexed gaze change events from a gaze detection model

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::{AnnotationFormat, DecodeContext};
use crate::annotation::{FrameAnnotations, FrameSpan, time_to_frame};
use crate::errors::GazelineError;

const GAZE_CHANGE: &str = "gaze";

#[derive(Deserialize, Debug)]
struct RawChange {
    /// Frame index
    #[serde(default)]
    frame: Option<Value>,
    /// Milliseconds since the start of the video, or a non-numeric summary tag
    #[serde(default)]
    timestamp: Option<Value>,
    change_type: String,
    #[serde(default)]
    details: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct GazeDetails {
    human: u32,
    contact: String,
}

#[derive(Debug)]
struct GazeChange {
    frame: u64,
    human: u32,
    contact: String,
}

impl RawChange {
    fn frame_index(&self, frame_rate: f64) -> Option<u64> {
        if let Some(frame) = self.frame.as_ref().and_then(Value::as_f64) {
            return Some(frame.round().max(0.) as u64);
        }
        self.timestamp
            .as_ref()
            .and_then(Value::as_f64)
            .map(|millis| time_to_frame(millis / 1000., frame_rate))
    }

    fn into_gaze_change(self, frame_rate: f64) -> Option<GazeChange> {
        if self.change_type != GAZE_CHANGE {
            return None;
        }
        let frame = self.frame_index(frame_rate)?;
        let details: GazeDetails = serde_json::from_value(self.details?).ok()?;
        Some(GazeChange {
            frame,
            human: details.human,
            contact: details.contact,
        })
    }
}

/// Requires a scan: an interval opens when a subject's contact becomes the
/// axis target and closes on the next change away from it.
pub struct EventLogFormat;

impl AnnotationFormat for EventLogFormat {
    fn name(&self) -> &'static str {
        "gaze event log"
    }

    fn matches(&self, document: &Value) -> bool {
        document
            .as_array()
            .is_some_and(|entries| entries.iter().any(|entry| entry.get("change_type").is_some()))
    }

    fn decode(
        &self,
        document: &Value,
        context: &DecodeContext,
    ) -> Result<FrameAnnotations, GazelineError> {
        let entries = document
            .as_array()
            .ok_or_else(|| GazelineError::UnrecognizedAnnotationFormat {
                reason: "event log must be an array".to_string(),
            })?;
        if !(context.frame_rate.is_finite() && context.frame_rate > 0.) {
            return Err(GazelineError::InvalidVideoInfo {
                reason: format!("cannot place events with frame rate {}", context.frame_rate),
            });
        }

        let mut changes: Vec<GazeChange> = entries
            .iter()
            .filter_map(|entry| {
                let change = serde_json::from_value::<RawChange>(entry.clone())
                    .ok()
                    .and_then(|raw| raw.into_gaze_change(context.frame_rate));
                if change.is_none() {
                    debug!("Skipping event log entry {entry}");
                }
                change
            })
            .collect();
        changes.sort_by_key(|change| change.frame);

        let last_frame = changes.last().map(|change| change.frame).unwrap_or(0);
        let mut annotations = FrameAnnotations::new(context.fallback_video_info(last_frame));
        let total_frames = annotations.video_info.total_frames;

        for spec in context.taxonomy.tracks() {
            let Some(target) = spec.label.contact_target() else {
                continue;
            };
            let mut spans = Vec::new();
            let mut open: Option<u64> = None;
            for change in changes.iter().filter(|change| change.human == spec.human_id) {
                let looking = change.contact == target;
                match (open, looking) {
                    (None, true) => open = Some(change.frame),
                    (Some(start), false) => {
                        if change.frame > start {
                            spans.push(FrameSpan::new(start, change.frame));
                        }
                        open = None;
                    }
                    _ => {}
                }
            }
            if let Some(start) = open {
                if total_frames > start {
                    spans.push(FrameSpan::new(start, total_frames));
                }
            }
            annotations.tracks.insert(spec.key, spans);
        }
        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Taxonomy, TrackKey};
    use serde_json::json;

    fn context(taxonomy: Taxonomy) -> DecodeContext {
        DecodeContext::new(taxonomy).with_duration(Some(10.))
    }

    #[test]
    fn test_scan_opens_and_closes_intervals() {
        let document = json!([
            { "frame": 30, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "frame": 60, "change_type": "gaze", "details": { "human": 1, "contact": "none" } },
            { "frame": 90, "change_type": "gaze", "details": { "human": 2, "contact": "human" } },
            { "frame": 120, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "frame": 150, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "frame": 180, "change_type": "gaze", "details": { "human": 1, "contact": "screen" } }
        ]);
        assert!(EventLogFormat.matches(&document));
        let decoded = EventLogFormat
            .decode(&document, &context(Taxonomy::LeftRight))
            .unwrap();

        assert_eq!(
            decoded.spans(&TrackKey::from("leftPersonGaze")),
            &[FrameSpan::new(30, 60), FrameSpan::new(120, 180)]
        );
        // still looking at the end of the video
        assert_eq!(
            decoded.spans(&TrackKey::from("rightPersonGaze")),
            &[FrameSpan::new(90, 300)]
        );
    }

    #[test]
    fn test_millisecond_timestamps_and_summary_rows() {
        let document = json!([
            { "timestamp": "total", "change_type": "percentages", "details": { "percentages": [1.0] } },
            { "timestamp": 2000, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "timestamp": 1000, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "timestamp": 3500, "change_type": "gaze", "details": { "human": 1, "contact": "away" } },
            { "timestamp": 4000, "change_type": "blink", "details": { "human": 1 } }
        ]);
        let decoded = EventLogFormat
            .decode(&document, &context(Taxonomy::LeftRight))
            .unwrap();
        assert_eq!(
            decoded.spans(&TrackKey::from("leftPersonGaze")),
            &[FrameSpan::new(30, 105)]
        );
    }

    #[test]
    fn test_screen_contact_fills_screen_axis() {
        let document = json!([
            { "frame": 0, "change_type": "gaze", "details": { "human": 2, "contact": "screen" } },
            { "frame": 45, "change_type": "gaze", "details": { "human": 2, "contact": "human" } },
            { "frame": 60, "change_type": "gaze", "details": { "human": 2, "contact": "none" } }
        ]);
        let decoded = EventLogFormat
            .decode(&document, &context(Taxonomy::DoctorPatient))
            .unwrap();
        assert_eq!(
            decoded.spans(&TrackKey::from("rightPersonScreen")),
            &[FrameSpan::new(0, 45)]
        );
        assert_eq!(
            decoded.spans(&TrackKey::from("rightPersonGaze")),
            &[FrameSpan::new(45, 60)]
        );
        assert!(decoded.spans(&TrackKey::from("leftPersonGaze")).is_empty());
    }

    #[test]
    fn test_without_duration_video_ends_at_last_event() {
        let document = json!([
            { "frame": 10, "change_type": "gaze", "details": { "human": 1, "contact": "human" } },
            { "frame": 40, "change_type": "gaze", "details": { "human": 1, "contact": "none" } }
        ]);
        let decoded = EventLogFormat
            .decode(&document, &DecodeContext::new(Taxonomy::LeftRight))
            .unwrap();
        assert_eq!(decoded.video_info.total_frames, 40);
        assert_eq!(
            decoded.spans(&TrackKey::from("leftPersonGaze")),
            &[FrameSpan::new(10, 40)]
        );
    }

    #[test]
    fn test_objects_do_not_match() {
        assert!(!EventLogFormat.matches(&json!({ "change_type": "gaze" })));
        assert!(!EventLogFormat.matches(&json!([])));
        assert!(!EventLogFormat.matches(&json!([{ "frame": 1 }])));
    }
}

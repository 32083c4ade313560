// Reading annotation documents from disk

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use super::{AnnotationCodec, DecodeContext};
use crate::{GazelineError, annotation::FrameAnnotations};

/// Read then parse an annotation document
pub fn load_annotations(
    source_file: &Path,
    codec: &AnnotationCodec,
    context: &DecodeContext,
) -> Result<FrameAnnotations, GazelineError> {
    let text = std::fs::read_to_string(source_file)
        .map_err(|e| GazelineError::AnnotationLoaderError { source: e })?;
    let annotations = codec.decode_str(&text, context)?;
    info!("Loaded annotations from {:?}", source_file);
    Ok(annotations)
}

/// [`load_annotations`] on the blocking pool, so the caller's event loop keeps running
pub async fn load_annotations_async(
    source_file: PathBuf,
    codec: Arc<AnnotationCodec>,
    context: DecodeContext,
) -> Result<FrameAnnotations, GazelineError> {
    tokio::task::spawn_blocking(move || load_annotations(&source_file, &codec, &context))
        .await
        .map_err(|e| GazelineError::ImportTaskError {
            reason: e.to_string(),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{FrameSpan, Taxonomy, TrackKey};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "videoInfo": { "duration": 4.0, "frameRate": 30.0, "totalFrames": 120 },
        "manualAnnotations": { "leftPersonGaze": [ { "startFrame": 3, "endFrame": 9 } ] }
    }"#;

    #[test]
    fn test_load_annotations() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let annotations = load_annotations(
            file.path(),
            &AnnotationCodec::new(),
            &DecodeContext::new(Taxonomy::LeftRight),
        )
        .unwrap();
        assert_eq!(
            annotations.spans(&TrackKey::from("leftPersonGaze")),
            &[FrameSpan::new(3, 9)]
        );
    }

    #[test]
    fn test_missing_file() {
        let result = load_annotations(
            Path::new("/nonexistent/annotations.json"),
            &AnnotationCodec::new(),
            &DecodeContext::new(Taxonomy::LeftRight),
        );
        assert!(matches!(
            result,
            Err(GazelineError::AnnotationLoaderError { .. })
        ));
    }

    #[test]
    fn test_load_annotations_async() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let annotations = runtime
            .block_on(load_annotations_async(
                file.path().to_path_buf(),
                Arc::new(AnnotationCodec::new()),
                DecodeContext::new(Taxonomy::LeftRight),
            ))
            .unwrap();
        assert_eq!(annotations.video_info.total_frames, 120);
    }
}

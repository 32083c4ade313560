// Export of frame documents to disk

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use super::AnnotationCodec;
use crate::{GazelineError, annotation::FrameAnnotations};

pub fn write_annotations(file: &Path, annotations: &FrameAnnotations) -> Result<(), GazelineError> {
    let annotation_file =
        File::create(file).map_err(|e| GazelineError::WriterError { source: e })?;
    let mut annotation_file_writer = BufWriter::new(annotation_file);
    serde_json::to_writer_pretty(
        &mut annotation_file_writer,
        &AnnotationCodec::encode(annotations),
    )
    .map_err(|e| GazelineError::SerializeError { source: e })?;
    annotation_file_writer
        .flush()
        .map_err(|e| GazelineError::WriterError { source: e })?;
    info!("Wrote {} tracks to {:?}", annotations.tracks.len(), file);
    Ok(())
}

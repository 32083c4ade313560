// Per-category accuracy report comparing a prediction against manual annotations

use std::fmt;

use log::{debug, warn};
use serde::Serialize;

use super::confusion::{ClassificationMetrics, ConfusionMatrix};
use super::raster::rasterize_spans;
use crate::annotation::{FrameAnnotations, Taxonomy, TrackKey, VideoInfo};

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CategoryReport {
    pub key: TrackKey,
    pub title: String,
    pub matrix: ConfusionMatrix,
    pub metrics: ClassificationMetrics,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AccuracyReport {
    pub total_frames: u64,
    pub categories: Vec<CategoryReport>,
    /// Mean of the per-category accuracies
    pub overall: f64,
}

impl AccuracyReport {
    pub fn category(&self, key: &TrackKey) -> Option<&CategoryReport> {
        self.categories.iter().find(|category| &category.key == key)
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            writeln!(f, "{} ({})", category.title, category.key)?;
            writeln!(f, "  Accuracy   {:>6.1}%", category.metrics.accuracy)?;
            writeln!(f, "  Precision  {:>6.1}%", category.metrics.precision)?;
            writeln!(f, "  Recall     {:>6.1}%", category.metrics.recall)?;
            writeln!(f, "  F1 Score   {:>6.1}%", category.metrics.f1)?;
        }
        write!(f, "Overall accuracy {:.1}% over {} frames", self.overall, self.total_frames)
    }
}

/// Arithmetic mean of category accuracies, `None` without categories
pub fn overall_accuracy(metrics: &[ClassificationMetrics]) -> Option<f64> {
    if metrics.is_empty() {
        return None;
    }
    Some(metrics.iter().map(|m| m.accuracy).sum::<f64>() / metrics.len() as f64)
}

/// Scores predictions on every axis of a taxonomy.
pub struct AccuracyEvaluator {
    taxonomy: Taxonomy,
}

impl AccuracyEvaluator {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Compare on the ground truth's frame grid, `round(duration * frameRate)`
    /// frames long whatever frame count the annotations carry. Spans are used
    /// as stored, a missing track counts as never looking.
    ///
    /// Returns `None` when the ground truth has no usable duration or frame rate.
    pub fn evaluate(
        &self,
        ground_truth: &FrameAnnotations,
        prediction: &FrameAnnotations,
    ) -> Option<AccuracyReport> {
        let stored = ground_truth.video_info;
        let video_info = match VideoInfo::new(stored.duration, stored.frame_rate) {
            Ok(info) if info.is_measurable() => info,
            _ => {
                warn!("No report available, video info is not usable: {stored:?}");
                return None;
            }
        };
        if prediction.video_info.frame_rate != video_info.frame_rate {
            warn!(
                "Prediction frame rate {} differs from {}, comparing stored frame numbers",
                prediction.video_info.frame_rate, video_info.frame_rate
            );
        }

        let total_frames = video_info.total_frames as usize;
        let mut categories = Vec::new();
        for spec in self.taxonomy.tracks() {
            let truth = rasterize_spans(ground_truth.spans(&spec.key), total_frames);
            let predicted = rasterize_spans(prediction.spans(&spec.key), total_frames);
            let matrix = ConfusionMatrix::compare(&truth, &predicted).ok()?;
            debug!("{}: {matrix:?}", spec.key);
            categories.push(CategoryReport {
                key: spec.key,
                title: spec.title.to_string(),
                matrix,
                metrics: matrix.metrics(),
            });
        }

        let metrics: Vec<ClassificationMetrics> =
            categories.iter().map(|category| category.metrics).collect();
        Some(AccuracyReport {
            total_frames: video_info.total_frames,
            overall: overall_accuracy(&metrics)?,
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::FrameSpan;

    fn annotations(duration: f64, tracks: &[(&str, Vec<FrameSpan>)]) -> FrameAnnotations {
        let mut frames = FrameAnnotations::new(VideoInfo::new(duration, 30.).unwrap());
        for (key, spans) in tracks {
            frames.tracks.insert(TrackKey::from(*key), spans.clone());
        }
        frames
    }

    #[test]
    fn test_evaluate_left_right() {
        let truth = annotations(
            10.,
            &[
                ("leftPersonGaze", vec![FrameSpan::new(60, 120)]),
                ("rightPersonGaze", vec![FrameSpan::new(0, 300)]),
            ],
        );
        let prediction = annotations(
            10.,
            &[
                ("leftPersonGaze", vec![FrameSpan::new(90, 150)]),
                ("rightPersonGaze", vec![FrameSpan::new(0, 300)]),
            ],
        );

        let report = AccuracyEvaluator::new(Taxonomy::LeftRight)
            .evaluate(&truth, &prediction)
            .unwrap();
        assert_eq!(report.total_frames, 300);
        assert_eq!(report.categories.len(), 2);

        let left = report.category(&TrackKey::from("leftPersonGaze")).unwrap();
        assert_eq!(left.metrics.accuracy, 80.);
        let right = report.category(&TrackKey::from("rightPersonGaze")).unwrap();
        assert_eq!(right.metrics.accuracy, 100.);
        assert_eq!(right.metrics.f1, 100.);
        assert_eq!(report.overall, 90.);
    }

    #[test]
    fn test_missing_tracks_count_as_negative() {
        let truth = annotations(10., &[]);
        let prediction = annotations(10., &[("rightPersonScreen", vec![FrameSpan::new(0, 30)])]);

        let report = AccuracyEvaluator::new(Taxonomy::DoctorPatient)
            .evaluate(&truth, &prediction)
            .unwrap();
        assert_eq!(report.categories.len(), 3);
        let screen = report.category(&TrackKey::from("rightPersonScreen")).unwrap();
        assert_eq!(screen.matrix.false_positive, 30);
        assert_eq!(screen.metrics.precision, 0.);
        assert_eq!(screen.metrics.accuracy, 90.);
    }

    #[test]
    fn test_grid_follows_duration_and_frame_rate() {
        let mut truth = annotations(10., &[("leftPersonGaze", vec![FrameSpan::new(150, 250)])]);
        truth.video_info.total_frames = 100;
        let prediction = annotations(10., &[]);

        let report = AccuracyEvaluator::new(Taxonomy::LeftRight)
            .evaluate(&truth, &prediction)
            .unwrap();
        assert_eq!(report.total_frames, 300);
        let left = report.category(&TrackKey::from("leftPersonGaze")).unwrap();
        assert_eq!(left.matrix.false_negative, 100);
        assert_eq!(left.matrix.true_negative, 200);
        assert!((left.metrics.accuracy - 200. / 3.).abs() < 1e-9);
    }

    #[test]
    fn test_no_report_without_duration() {
        let truth = annotations(0., &[]);
        let prediction = annotations(10., &[]);
        assert!(
            AccuracyEvaluator::new(Taxonomy::LeftRight)
                .evaluate(&truth, &prediction)
                .is_none()
        );
    }

    #[test]
    fn test_overall_accuracy() {
        let metrics = |accuracy| ClassificationMetrics {
            accuracy,
            precision: 0.,
            recall: 0.,
            f1: 0.,
        };
        assert_eq!(overall_accuracy(&[metrics(80.), metrics(100.), metrics(60.)]), Some(80.));
        assert_eq!(overall_accuracy(&[]), None);
    }

    #[test]
    fn test_report_display() {
        let truth = annotations(1., &[("leftPersonGaze", vec![FrameSpan::new(0, 15)])]);
        let report = AccuracyEvaluator::new(Taxonomy::LeftRight)
            .evaluate(&truth, &truth)
            .unwrap();
        let text = report.to_string();
        assert!(text.contains("Person on left (leftPersonGaze)"));
        assert!(text.contains("Overall accuracy 100.0% over 30 frames"));
    }
}

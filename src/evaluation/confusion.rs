// Confusion matrix and classification metrics over frame arrays

use serde::Serialize;

use super::raster::FrameArray;
use crate::errors::GazelineError;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
}

impl ConfusionMatrix {
    /// Frame-by-frame comparison of a prediction against ground truth
    pub fn compare(
        ground_truth: &FrameArray<bool>,
        predicted: &FrameArray<bool>,
    ) -> Result<Self, GazelineError> {
        if ground_truth.len() != predicted.len() {
            return Err(GazelineError::FrameCountMismatch {
                expected: ground_truth.len(),
                actual: predicted.len(),
            });
        }
        let mut matrix = Self::default();
        for (truth, prediction) in ground_truth.iter().zip(predicted.iter()) {
            match (*truth, *prediction) {
                (true, true) => matrix.true_positive += 1,
                (false, true) => matrix.false_positive += 1,
                (true, false) => matrix.false_negative += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    pub fn metrics(&self) -> ClassificationMetrics {
        let tp = self.true_positive as f64;
        let fp = self.false_positive as f64;
        let fn_ = self.false_negative as f64;
        let tn = self.true_negative as f64;
        ClassificationMetrics {
            accuracy: percentage(tp + tn, self.total() as f64),
            precision: percentage(tp, tp + fp),
            recall: percentage(tp, tp + fn_),
            f1: percentage(tp, tp + 0.5 * (fp + fn_)),
        }
    }
}

/// Percentages in `[0, 100]`
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// A zero denominator scores 0%
fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0. {
        0.
    } else {
        numerator * 100. / denominator
    }
}

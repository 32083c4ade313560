// Rasterization and accuracy evaluation of annotation sets

pub mod confusion;
pub mod raster;
pub mod report;

pub use confusion::{ClassificationMetrics, ConfusionMatrix};
pub use raster::{FrameArray, rasterize, rasterize_spans, runs};
pub use report::{AccuracyEvaluator, AccuracyReport, CategoryReport, overall_accuracy};

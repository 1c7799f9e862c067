//! Report generation port trait.

use crate::domain::engine::LabelingResult;
use crate::domain::error::TribarError;
use std::path::{Path, PathBuf};

/// Port for writing labeling results.
pub trait ReportPort {
    /// Write artifacts into `output_dir`, returning the files written.
    fn write(&self, result: &LabelingResult, output_dir: &Path) -> Result<Vec<PathBuf>, TribarError>;

    /// Default implementation: the metrics summary alone.
    fn render_summary(&self, result: &LabelingResult) -> String {
        result.metrics.summary()
    }
}

//! Metric model error types.

use thiserror::Error;

pub type MetricResult<T> = Result<T, MetricError>;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("family {family}: expected {expected} label values, got {got}")]
    LabelCount {
        family: String,
        expected: usize,
        got: usize,
    },

    #[error("exposition text line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

//! Collector error types.

use thiserror::Error;

use pve_client::ApiError;
use pve_metrics::MetricError;

/// Errors that abort a scrape.
///
/// Per-node API failures inside the config and volume collectors are
/// recovered before they reach this type's callers.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("PVE API error: {0}")]
    Api(#[from] ApiError),

    #[error("metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unexpected status entry type {0:?}")]
    UnexpectedStatusType(String),

    #[error("version response carries none of release, repoid, version")]
    MissingVersionInfo,

    #[error("{entity}: missing field {field:?}")]
    MissingField { entity: String, field: String },

    #[error("{entity}: field {field:?} is not numeric ({value})")]
    NonNumeric {
        entity: String,
        field: String,
        value: String,
    },
}

pub type CollectResult<T> = Result<T, CollectError>;

//! pve-api — HTTP surface of the PVE exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/pve?target=<host>&module=<name>` | Scrape a PVE host |
//! | GET | `/metrics` | Exporter self-metrics |
//! | GET | `/` | Index page |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use pve_core::{CollectorsOptions, ExporterConfig};
use pve_metrics::ExporterMetrics;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<ExporterConfig>,
    pub options: CollectorsOptions,
    pub metrics: Arc<ExporterMetrics>,
}

impl ApiState {
    pub fn new(config: ExporterConfig, options: CollectorsOptions) -> Self {
        Self {
            config: Arc::new(config),
            options,
            metrics: Arc::new(ExporterMetrics::new()),
        }
    }
}

/// Build the complete exporter router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/pve", get(handlers::scrape))
        .route("/metrics", get(handlers::self_metrics))
        .with_state(state)
}

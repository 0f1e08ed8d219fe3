//! pve-metrics — metric model and Prometheus text exposition.
//!
//! Collectors build [`MetricFamily`] values and hand them to a per-scrape
//! [`Registry`], which renders them in the Prometheus text format. The same
//! grammar is parsed back by [`parse_text`] so operator-authored metric
//! blocks can be merged into a scrape.
//!
//! # Architecture
//!
//! ```text
//! MetricFamily (name, help, type, label schema, samples)
//!   └── Registry::register() → Registry::render() → text/plain
//!
//! parse_text() ← exposition text → Vec<MetricFamily>
//!
//! ExporterMetrics
//!   ├── observe_collection() ← called per /pve request
//!   └── render() → text/plain for the exporter's own /metrics endpoint
//! ```

pub mod error;
pub mod exporter;
pub mod family;
pub mod parser;
pub mod prometheus;

pub use error::{MetricError, MetricResult};
pub use exporter::ExporterMetrics;
pub use family::{MetricFamily, MetricType, Registry, Sample};
pub use parser::parse_text;
pub use prometheus::render_prometheus;

//! pve-collector — turns PVE API records into Prometheus metric families.
//!
//! Each collector reads one or more API resources and yields zero or more
//! families. Collectors are stateless and independent; the dispatcher runs
//! the enabled ones in a fixed order against one client and renders the
//! result.
//!
//! # Architecture
//!
//! ```text
//! collect_pve(module, host, options)
//!   └── PveClient::connect()
//!       └── collect_with(api, options) → Registry → text
//!           ├── ClusterCustomMetricsCollector   (always)
//!           ├── StatusCollector                 (status)
//!           ├── ClusterResourcesCollector       (resources)
//!           ├── ClusterNodeCollector            (node)
//!           ├── ClusterInfoCollector            (cluster)
//!           ├── ClusterNodeConfigCollector      (config)
//!           ├── VersionCollector                (version)
//!           └── VolumesCollector                (volumes)
//! ```
//!
//! # Failure isolation
//!
//! The config and volume collectors fan out per node. An API error for one
//! node is logged and that node's series are left out; every other error
//! aborts the scrape.

pub mod cluster;
pub mod custom;
pub mod dispatch;
pub mod error;
mod fields;
pub mod node;
pub mod node_config;
pub mod resources;
pub mod status;
pub mod version;
pub mod volumes;

#[cfg(test)]
mod mock;

use std::future::Future;

use pve_metrics::MetricFamily;

pub use cluster::ClusterInfoCollector;
pub use custom::ClusterCustomMetricsCollector;
pub use dispatch::{collect_pve, collect_with};
pub use error::{CollectError, CollectResult};
pub use node::ClusterNodeCollector;
pub use node_config::ClusterNodeConfigCollector;
pub use resources::ClusterResourcesCollector;
pub use status::StatusCollector;
pub use version::VersionCollector;
pub use volumes::VolumesCollector;

/// A unit that produces metric families for one scrape.
pub trait Collector {
    /// Short name used in logs.
    const NAME: &'static str;

    fn collect(&self) -> impl Future<Output = CollectResult<Vec<MetricFamily>>> + Send;
}

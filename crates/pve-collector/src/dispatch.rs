//! Scrape entry points: build a client, run the enabled collectors, render.

use std::time::Instant;

use pve_client::{PveApi, PveClient};
use pve_core::{CollectorsOptions, ModuleConfig};
use pve_metrics::Registry;
use tracing::{debug, info};

use crate::error::CollectResult;
use crate::{
    ClusterCustomMetricsCollector, ClusterInfoCollector, ClusterNodeCollector,
    ClusterNodeConfigCollector, ClusterResourcesCollector, Collector, StatusCollector,
    VersionCollector, VolumesCollector,
};

/// Scrape `host` with the credentials of `module` and return exposition text.
pub async fn collect_pve(
    module: &ModuleConfig,
    host: &str,
    options: CollectorsOptions,
) -> CollectResult<String> {
    let client = PveClient::connect(host, module).await?;
    info!(host, "scraping PVE host");
    collect_with(&client, options).await
}

/// Run the enabled collectors against `api`, in registration order.
///
/// The notes collector always runs. The first error aborts the scrape.
pub async fn collect_with<A: PveApi>(api: &A, options: CollectorsOptions) -> CollectResult<String> {
    let started = Instant::now();
    let mut registry = Registry::new();

    run(&mut registry, ClusterCustomMetricsCollector::new(api)).await?;
    if options.status {
        run(&mut registry, StatusCollector::new(api)).await?;
    }
    if options.resources {
        run(&mut registry, ClusterResourcesCollector::new(api)).await?;
    }
    if options.node {
        run(&mut registry, ClusterNodeCollector::new(api)).await?;
    }
    if options.cluster {
        run(&mut registry, ClusterInfoCollector::new(api)).await?;
    }
    if options.config {
        run(&mut registry, ClusterNodeConfigCollector::new(api)).await?;
    }
    if options.version {
        run(&mut registry, VersionCollector::new(api)).await?;
    }
    if options.volumes {
        run(&mut registry, VolumesCollector::new(api)).await?;
    }

    debug!(
        families = registry.families().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scrape complete"
    );
    Ok(registry.render())
}

async fn run<C: Collector>(registry: &mut Registry, collector: C) -> CollectResult<()> {
    let started = Instant::now();
    let families = collector.collect().await?;
    debug!(
        collector = C::NAME,
        families = families.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "collector finished"
    );
    registry.register(families);
    Ok(())
}

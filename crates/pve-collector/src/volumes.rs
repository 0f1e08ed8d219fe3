//! Volume sizes on active directory storages.
//!
//! Each volume's configured size is exported on its own, one sample per
//! volume, with shared storages reported by a single node.
//!
//! ```text
//! # HELP pve_volume_size_bytes Proxmox volume commitments
//! # TYPE pve_volume_size_bytes gauge
//! pve_volume_size_bytes{id="disk/pve1/local:iso/debian.iso",node="pve1",storage="local"} 650117120
//! ```

use std::collections::HashSet;

use pve_client::PveApi;
use pve_core::{Record, flag_field};
use pve_metrics::MetricFamily;
use tracing::{debug, warn};

use crate::error::{CollectError, CollectResult};
use crate::fields::{numeric, required};
use crate::Collector;

/// Rows for one node plus the shared storages it claimed.
struct NodeVolumes {
    rows: Vec<([String; 3], f64)>,
    claimed: Vec<String>,
}

pub struct VolumesCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> VolumesCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    async fn collect_node(&self, node: &str, seen_shared: &HashSet<String>) -> CollectResult<NodeVolumes> {
        let mut out = NodeVolumes {
            rows: Vec::new(),
            claimed: Vec::new(),
        };

        for storage in self.api.node_storages(node).await? {
            let name = required(&storage, "storage", &format!("storage on {node}"))?.into_owned();
            if !is_scraped_backend(&storage) {
                debug!(node, storage = %name, "skipping storage backend");
                continue;
            }

            if flag_field(&storage, "shared") {
                if seen_shared.contains(&name) || out.claimed.contains(&name) {
                    continue;
                }
                out.claimed.push(name.clone());
            }

            for volume in self.api.storage_content(node, &name).await? {
                let volid = required(&volume, "volid", &format!("volume on {node}/{name}"))?;
                let id = format!("disk/{node}/{volid}");
                let size = numeric(&volume, "size", &id)?;
                out.rows.push(([id, node.to_string(), name.clone()], size));
            }
        }

        Ok(out)
    }
}

/// Only active directory backends are listed.
fn is_scraped_backend(storage: &Record) -> bool {
    storage.get("type").and_then(|t| t.as_str()) == Some("dir") && flag_field(storage, "active")
}

impl<A: PveApi> Collector for VolumesCollector<'_, A> {
    const NAME: &'static str = "volumes";

    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let mut sizes = MetricFamily::gauge(
            "pve_volume_size_bytes",
            "Proxmox volume commitments",
            &["id", "node", "storage"],
        );
        let mut seen_shared = HashSet::new();

        for node in self.api.nodes().await? {
            let name = required(&node, "node", "node list entry")?;

            match self.collect_node(&name, &seen_shared).await {
                Ok(NodeVolumes { rows, claimed }) => {
                    for (labels, size) in rows {
                        sizes.add_metric(labels, size)?;
                    }
                    seen_shared.extend(claimed);
                }
                Err(CollectError::Api(e)) => {
                    warn!(node = %name, error = %e, "failed to scrape volumes, skipping node");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(vec![sizes])
    }
}

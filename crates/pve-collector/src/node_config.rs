//! Guest configuration values read directly from each guest's config.
//!
//! For manual testing: `pvesh get /nodes/<node>/<type>/<vmid>/config`.
//!
//! ```text
//! # HELP pve_onboot_status Proxmox vm config onboot value
//! # TYPE pve_onboot_status gauge
//! pve_onboot_status{id="qemu/113",node="pve1",type="qemu"} 1
//! ```

use pve_client::PveApi;
use pve_core::GuestKind;
use pve_metrics::MetricFamily;
use tracing::warn;

use crate::error::{CollectError, CollectResult};
use crate::fields::{numeric, required};
use crate::Collector;

/// Config key → (family name, help).
const CONFIG_METRICS: [(&str, &str, &str); 1] =
    [("onboot", "pve_onboot_status", "Proxmox vm config onboot value")];

const LABELS: [&str; 3] = ["id", "node", "type"];

/// Samples gathered for one node: (family index, label values, value).
type NodeRows = Vec<(usize, [String; 3], f64)>;

pub struct ClusterNodeConfigCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> ClusterNodeConfigCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Every config sample for the guests of one node.
    ///
    /// `nodes/{node}/...` calls are proxied by the API host to the target
    /// node and fail when that node is down; the caller decides what to do.
    async fn collect_node(&self, node: &str) -> CollectResult<NodeRows> {
        let mut rows = Vec::new();

        for kind in GuestKind::ALL {
            for guest in self.api.node_guests(node, kind).await? {
                let vmid = required(&guest, "vmid", &format!("{kind} guest on {node}"))?.into_owned();
                let config = self.api.guest_config(node, kind, &vmid).await?;
                let id = format!("{kind}/{vmid}");

                for (index, (key, ..)) in CONFIG_METRICS.iter().enumerate() {
                    if config.contains_key(*key) {
                        let value = numeric(&config, key, &id)?;
                        rows.push((index, [id.clone(), node.to_string(), kind.to_string()], value));
                    }
                }
            }
        }

        Ok(rows)
    }
}

impl<A: PveApi> Collector for ClusterNodeConfigCollector<'_, A> {
    const NAME: &'static str = "config";

    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let mut metrics: Vec<MetricFamily> = CONFIG_METRICS
            .iter()
            .map(|(_, name, help)| MetricFamily::gauge(*name, *help, &LABELS))
            .collect();

        for node in self.api.nodes().await? {
            let name = required(&node, "node", "node list entry")?;

            match self.collect_node(&name).await {
                Ok(rows) => {
                    for (index, labels, value) in rows {
                        metrics[index].add_metric(labels, value)?;
                    }
                }
                Err(CollectError::Api(e)) => {
                    warn!(node = %name, error = %e, "failed to scrape guest config, skipping node");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(metrics)
    }
}

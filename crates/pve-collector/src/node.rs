//! Cluster node membership information.
//!
//! ```text
//! # HELP pve_node_info Node info
//! # TYPE pve_node_info gauge
//! pve_node_info{id="node/proxmox-host",level="c",name="proxmox-host",nodeid="0"} 1
//! ```

use pve_client::PveApi;
use pve_core::label_of;
use pve_metrics::MetricFamily;

use crate::error::CollectResult;
use crate::Collector;

const LABELS: [&str; 4] = ["id", "level", "name", "nodeid"];

pub struct ClusterNodeCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> ClusterNodeCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for ClusterNodeCollector<'_, A> {
    const NAME: &'static str = "node";

    /// Yields nothing at all, not even an empty family, without nodes.
    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let status = self.api.cluster_status().await?;
        let nodes: Vec<_> = status
            .iter()
            .filter(|entry| entry.get("type").and_then(|t| t.as_str()) == Some("node"))
            .collect();
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let mut info = MetricFamily::gauge("pve_node_info", "Node info", &LABELS);
        for node in nodes {
            info.add_metric(LABELS.map(|key| label_of(node, key)), 1.0)?;
        }
        Ok(vec![info])
    }
}

//! Cluster-wide information.
//!
//! ```text
//! # HELP pve_cluster_info Cluster info
//! # TYPE pve_cluster_info gauge
//! pve_cluster_info{id="cluster/pvec",nodes="2",quorate="1",version="2"} 1
//! ```
//!
//! The label schema comes from the first cluster entry: its keys in the
//! order the API sent them, minus `type` and `name`, with `id` rewritten to
//! `cluster/{name}` (appended when the entry has no `id` of its own).

use pve_client::PveApi;
use pve_core::{Record, label_value};
use pve_metrics::MetricFamily;

use crate::error::CollectResult;
use crate::fields::required;
use crate::Collector;

pub struct ClusterInfoCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> ClusterInfoCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for ClusterInfoCollector<'_, A> {
    const NAME: &'static str = "cluster";

    /// Yields nothing when the status lists no cluster (standalone node).
    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let status = self.api.cluster_status().await?;
        let clusters = status
            .iter()
            .filter(|entry| entry.get("type").and_then(|t| t.as_str()) == Some("cluster"))
            .map(cluster_labels)
            .collect::<CollectResult<Vec<_>>>()?;

        let Some(first) = clusters.first() else {
            return Ok(Vec::new());
        };

        let schema: Vec<String> = first.iter().map(|(key, _)| key.clone()).collect();
        let mut info = MetricFamily::gauge("pve_cluster_info", "Cluster info", &schema);
        for labels in &clusters {
            let values = schema.iter().map(|key| {
                labels
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            });
            info.add_metric(values, 1.0)?;
        }
        Ok(vec![info])
    }
}

/// Ordered label pairs for one cluster status entry.
fn cluster_labels(entry: &Record) -> CollectResult<Vec<(String, String)>> {
    let id = format!("cluster/{}", required(entry, "name", "cluster status entry")?);

    let mut labels: Vec<(String, String)> = entry
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "type" | "name"))
        .map(|(key, value)| (key.clone(), label_value(value)))
        .collect();

    match labels.iter_mut().find(|(key, _)| key == "id") {
        Some((_, value)) => *value = id,
        None => labels.push(("id".to_string(), id)),
    }
    Ok(labels)
}

//! Cluster resource usage: memory, storage, cpu and network counters for
//! nodes, guests and storages, plus guest and storage info families.
//!
//! Each family declares a fixed label schema. A record lacking one of those
//! fields (node records carry no `storage`) gets an empty label value, which
//! Prometheus reads the same as an absent label.

use pve_client::PveApi;
use pve_core::{Record, label_of};
use pve_metrics::MetricFamily;

use crate::error::CollectResult;
use crate::fields::{describe, numeric, required};
use crate::Collector;

/// Record field → (family name, help, label schema).
const RESOURCE_METRICS: [(&str, &str, &str, &[&str]); 12] = [
    ("maxdisk", "pve_disk_size_bytes", "Size of storage device", &["id", "type", "storage", "node"]),
    ("disk", "pve_disk_usage_bytes", "Disk usage in bytes", &["id"]),
    ("maxmem", "pve_memory_size_bytes", "Size of memory", &["id", "node", "type"]),
    ("mem", "pve_memory_usage_bytes", "Memory usage in bytes", &["id", "node", "type"]),
    ("netout", "pve_network_transmit_bytes", "Number of bytes transmitted over the network", &["id"]),
    ("netin", "pve_network_receive_bytes", "Number of bytes received over the network", &["id"]),
    ("diskwrite", "pve_disk_write_bytes", "Number of bytes written to storage", &["id"]),
    ("diskread", "pve_disk_read_bytes", "Number of bytes read from storage", &["id"]),
    ("cpu", "pve_cpu_usage_ratio", "CPU usage (value between 0.0 and pve_cpu_usage_limit)", &["id", "node", "type"]),
    ("maxcpu", "pve_cpu_usage_limit", "Maximum allowed CPU usage", &["id", "node", "type"]),
    ("uptime", "pve_uptime_seconds", "Number of seconds since the last boot", &["id"]),
    ("shared", "pve_storage_shared", "Whether or not the storage is shared among cluster nodes", &["id"]),
];

const GUEST_INFO_LABELS: [&str; 4] = ["id", "node", "name", "type"];
const STORAGE_INFO_LABELS: [&str; 3] = ["id", "node", "storage"];

pub struct ClusterResourcesCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> ClusterResourcesCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for ClusterResourcesCollector<'_, A> {
    const NAME: &'static str = "resources";

    /// Always yields all 14 families, empty or not.
    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let mut metrics: Vec<MetricFamily> = RESOURCE_METRICS
            .iter()
            .map(|(_, name, help, labels)| MetricFamily::gauge(*name, *help, *labels))
            .collect();
        // lxc and qemu share one family so guests can be queried uniformly.
        let mut guest_info = MetricFamily::gauge("pve_guest_info", "VM/CT info", &GUEST_INFO_LABELS);
        let mut storage_info =
            MetricFamily::gauge("pve_storage_info", "Storage info", &STORAGE_INFO_LABELS);

        for resource in self.api.cluster_resources(None).await? {
            let entity = describe(&resource);
            let restype = required(&resource, "type", &entity)?;

            match restype.as_ref() {
                "lxc" | "qemu" => add_padded(&mut guest_info, &resource, 1.0)?,
                "storage" => add_padded(&mut storage_info, &resource, 1.0)?,
                _ => {}
            }

            for ((field, ..), family) in RESOURCE_METRICS.iter().zip(metrics.iter_mut()) {
                if resource.contains_key(*field) {
                    let value = numeric(&resource, field, &entity)?;
                    add_padded(family, &resource, value)?;
                }
            }
        }

        metrics.push(guest_info);
        metrics.push(storage_info);
        Ok(metrics)
    }
}

/// Add a sample taking each declared label from `record`, `""` when absent.
fn add_padded(family: &mut MetricFamily, record: &Record, value: f64) -> CollectResult<()> {
    let values: Vec<String> = family
        .label_names()
        .iter()
        .map(|key| label_of(record, key))
        .collect();
    family.add_metric(values, value)?;
    Ok(())
}

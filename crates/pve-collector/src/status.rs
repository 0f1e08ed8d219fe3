//! Node, cluster and guest up/down status.
//!
//! ```text
//! # HELP pve_up Node/VM/CT-Status is online/running
//! # TYPE pve_up gauge
//! pve_up{id="node/proxmox-host"} 1
//! pve_up{id="cluster/pvec"} 1
//! pve_up{id="lxc/101"} 1
//! pve_up{id="qemu/102"} 1
//! ```

use pve_client::PveApi;
use pve_metrics::MetricFamily;

use crate::error::{CollectError, CollectResult};
use crate::fields::{numeric, required};
use crate::Collector;

pub struct StatusCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> StatusCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for StatusCollector<'_, A> {
    const NAME: &'static str = "status";

    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let mut up = MetricFamily::gauge("pve_up", "Node/VM/CT-Status is online/running", &["id"]);

        for entry in self.api.cluster_status().await? {
            let kind = required(&entry, "type", "cluster status entry")?;
            match kind.as_ref() {
                "node" => {
                    let id = required(&entry, "id", "node status entry")?;
                    let online = numeric(&entry, "online", &id)?;
                    up.add_metric([id], online)?;
                }
                "cluster" => {
                    let name = required(&entry, "name", "cluster status entry")?;
                    let id = format!("cluster/{name}");
                    let quorate = numeric(&entry, "quorate", &id)?;
                    up.add_metric([id], quorate)?;
                }
                other => return Err(CollectError::UnexpectedStatusType(other.to_string())),
            }
        }

        for resource in self.api.cluster_resources(Some("vm")).await? {
            let id = required(&resource, "id", "vm resource")?;
            let running = required(&resource, "status", &id)? == "running";
            up.add_metric([id], if running { 1.0 } else { 0.0 })?;
        }

        Ok(vec![up])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockApi, recs};
    use serde_json::json;

    fn cluster_api() -> MockApi {
        MockApi {
            status: recs([
                json!({"type": "cluster", "id": "cluster", "name": "pvec", "quorate": 1, "nodes": 2, "version": 2}),
                json!({"type": "node", "id": "node/pve1", "name": "pve1", "online": 1, "level": "", "nodeid": 1}),
                json!({"type": "node", "id": "node/pve2", "name": "pve2", "online": 0, "level": "", "nodeid": 2}),
            ]),
            resources: recs([
                json!({"id": "qemu/100", "type": "qemu", "status": "running", "node": "pve1"}),
                json!({"id": "lxc/101", "type": "lxc", "status": "stopped", "node": "pve2"}),
                json!({"id": "storage/pve1/local", "type": "storage", "status": "available"}),
            ]),
            ..MockApi::new()
        }
    }

    fn values(family: &MetricFamily) -> Vec<(String, f64)> {
        family
            .samples
            .iter()
            .map(|s| (s.label("id").unwrap().to_string(), s.value))
            .collect()
    }

    #[tokio::test]
    async fn one_sample_per_status_entry_and_guest() {
        let api = cluster_api();
        let families = StatusCollector::new(&api).collect().await.unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].name, "pve_up");

        assert_eq!(
            values(&families[0]),
            vec![
                ("cluster/pvec".to_string(), 1.0),
                ("node/pve1".to_string(), 1.0),
                ("node/pve2".to_string(), 0.0),
                ("qemu/100".to_string(), 1.0),
                ("lxc/101".to_string(), 0.0),
            ]
        );
    }

    #[tokio::test]
    async fn vm_resources_are_requested_filtered() {
        let api = cluster_api();
        StatusCollector::new(&api).collect().await.unwrap();
        assert!(api.calls().contains(&"cluster/resources?type=vm".to_string()));
    }

    #[tokio::test]
    async fn unexpected_entry_type_fails() {
        let api = MockApi {
            status: recs([
                json!({"type": "node", "id": "node/pve1", "online": 1}),
                json!({"type": "qdevice", "id": "qdevice"}),
            ]),
            ..MockApi::new()
        };
        let err = StatusCollector::new(&api).collect().await.unwrap_err();
        assert!(matches!(err, CollectError::UnexpectedStatusType(ref t) if t == "qdevice"));
    }

    #[tokio::test]
    async fn missing_online_flag_is_fatal() {
        let api = MockApi {
            status: recs([json!({"type": "node", "id": "node/pve1", "name": "pve1"})]),
            ..MockApi::new()
        };
        let err = StatusCollector::new(&api).collect().await.unwrap_err();
        assert!(matches!(err, CollectError::MissingField { ref field, .. } if field == "online"));
    }

    #[tokio::test]
    async fn missing_quorate_flag_is_fatal() {
        let api = MockApi {
            status: recs([json!({"type": "cluster", "id": "cluster", "name": "pvec"})]),
            ..MockApi::new()
        };
        let err = StatusCollector::new(&api).collect().await.unwrap_err();
        assert!(matches!(err, CollectError::MissingField { ref field, .. } if field == "quorate"));
    }

    #[tokio::test]
    async fn guest_without_status_is_fatal() {
        let api = MockApi {
            resources: recs([json!({"id": "qemu/100", "type": "qemu", "node": "pve1"})]),
            ..MockApi::new()
        };
        let err = StatusCollector::new(&api).collect().await.unwrap_err();
        assert!(matches!(err, CollectError::MissingField { ref field, .. } if field == "status"));
    }

    #[tokio::test]
    async fn empty_cluster_still_yields_family() {
        let api = MockApi::new();
        let families = StatusCollector::new(&api).collect().await.unwrap();
        assert_eq!(families.len(), 1);
        assert!(families[0].is_empty());
    }
}

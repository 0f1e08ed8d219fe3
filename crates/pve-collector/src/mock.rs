//! In-memory [`PveApi`] for collector tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::Value;

use pve_client::{ApiError, ApiResult, PveApi};
use pve_core::{GuestKind, Record};

/// Canned API responses. Node-scoped calls for nodes in `failing_nodes`,
/// or to a path listed in `failing_paths`, return a transport-style error.
#[derive(Default)]
pub struct MockApi {
    pub status: Vec<Record>,
    pub resources: Vec<Record>,
    pub options: Record,
    pub version: Record,
    pub nodes: Vec<Record>,
    pub guests: HashMap<(String, GuestKind), Vec<Record>>,
    pub configs: HashMap<(String, GuestKind, String), Record>,
    pub storages: HashMap<String, Vec<Record>>,
    pub contents: HashMap<(String, String), Vec<Record>>,
    pub failing_nodes: HashSet<String>,
    pub failing_paths: HashSet<String>,
    pub(crate) calls: Mutex<Vec<String>>,
}

/// Build a record from a `json!` object literal.
pub fn rec(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn recs(values: impl IntoIterator<Item = Value>) -> Vec<Record> {
    values.into_iter().map(rec).collect()
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(names: &[&str]) -> Self {
        Self {
            nodes: names
                .iter()
                .map(|n| rec(serde_json::json!({"node": n, "status": "online"})))
                .collect(),
            ..Self::default()
        }
    }

    /// Paths requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, path: String) {
        self.calls.lock().unwrap().push(path);
    }

    fn node_call(&self, node: &str, path: String) -> ApiResult<()> {
        self.record_call(path.clone());
        if self.failing_nodes.contains(node) || self.failing_paths.contains(&path) {
            return Err(ApiError::Status {
                path,
                status: 595,
                reason: format!("no route to host {node}"),
            });
        }
        Ok(())
    }
}

impl PveApi for MockApi {
    async fn cluster_status(&self) -> ApiResult<Vec<Record>> {
        self.record_call("cluster/status".into());
        Ok(self.status.clone())
    }

    async fn cluster_resources(&self, kind: Option<&str>) -> ApiResult<Vec<Record>> {
        self.record_call(format!("cluster/resources?type={}", kind.unwrap_or("")));
        let resources = self.resources.iter().filter(|r| {
            let restype = r.get("type").and_then(Value::as_str).unwrap_or_default();
            match kind {
                Some("vm") => restype == "qemu" || restype == "lxc",
                Some(kind) => restype == kind,
                None => true,
            }
        });
        Ok(resources.cloned().collect())
    }

    async fn cluster_options(&self) -> ApiResult<Record> {
        self.record_call("cluster/options".into());
        Ok(self.options.clone())
    }

    async fn version(&self) -> ApiResult<Record> {
        self.record_call("version".into());
        Ok(self.version.clone())
    }

    async fn nodes(&self) -> ApiResult<Vec<Record>> {
        self.record_call("nodes".into());
        Ok(self.nodes.clone())
    }

    async fn node_guests(&self, node: &str, kind: GuestKind) -> ApiResult<Vec<Record>> {
        self.node_call(node, format!("nodes/{node}/{kind}"))?;
        Ok(self
            .guests
            .get(&(node.to_string(), kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn guest_config(&self, node: &str, kind: GuestKind, vmid: &str) -> ApiResult<Record> {
        self.node_call(node, format!("nodes/{node}/{kind}/{vmid}/config"))?;
        Ok(self
            .configs
            .get(&(node.to_string(), kind, vmid.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn node_storages(&self, node: &str) -> ApiResult<Vec<Record>> {
        self.node_call(node, format!("nodes/{node}/storage"))?;
        Ok(self.storages.get(node).cloned().unwrap_or_default())
    }

    async fn storage_content(&self, node: &str, storage: &str) -> ApiResult<Vec<Record>> {
        self.node_call(node, format!("nodes/{node}/storage/{storage}/content"))?;
        Ok(self
            .contents
            .get(&(node.to_string(), storage.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

//! The read-only API surface collectors depend on.

use std::future::Future;

use pve_core::{GuestKind, Record};

use crate::error::ApiResult;

/// Read accessors for the PVE resources the exporter scrapes.
pub trait PveApi: Send + Sync {
    /// `GET cluster/status`
    fn cluster_status(&self) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// `GET cluster/resources`, optionally filtered by `type` (`vm`, `node`, `storage`).
    fn cluster_resources(
        &self,
        kind: Option<&str>,
    ) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// `GET cluster/options`
    fn cluster_options(&self) -> impl Future<Output = ApiResult<Record>> + Send;

    /// `GET version`
    fn version(&self) -> impl Future<Output = ApiResult<Record>> + Send;

    /// `GET nodes`
    fn nodes(&self) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// `GET nodes/{node}/{kind}`
    fn node_guests(
        &self,
        node: &str,
        kind: GuestKind,
    ) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// `GET nodes/{node}/{kind}/{vmid}/config`
    fn guest_config(
        &self,
        node: &str,
        kind: GuestKind,
        vmid: &str,
    ) -> impl Future<Output = ApiResult<Record>> + Send;

    /// `GET nodes/{node}/storage`
    fn node_storages(&self, node: &str) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;

    /// `GET nodes/{node}/storage/{storage}/content`
    fn storage_content(
        &self,
        node: &str,
        storage: &str,
    ) -> impl Future<Output = ApiResult<Vec<Record>>> + Send;
}

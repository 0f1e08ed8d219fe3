//! PVE build information.
//!
//! ```text
//! # HELP pve_version_info Proxmox VE version info
//! # TYPE pve_version_info gauge
//! pve_version_info{release="8.1",repoid="7599e35a",version="8.1.4"} 1
//! ```

use pve_client::PveApi;
use pve_core::label_value;
use pve_metrics::MetricFamily;

use crate::error::{CollectError, CollectResult};
use crate::Collector;

/// Version fields exposed as labels.
const LABEL_WHITELIST: [&str; 3] = ["release", "repoid", "version"];

pub struct VersionCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> VersionCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for VersionCollector<'_, A> {
    const NAME: &'static str = "version";

    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let version = self.api.version().await?;

        let (labels, values): (Vec<&str>, Vec<String>) = version
            .iter()
            .filter(|(key, _)| LABEL_WHITELIST.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), label_value(value)))
            .unzip();
        if labels.is_empty() {
            return Err(CollectError::MissingVersionInfo);
        }

        let mut info = MetricFamily::gauge("pve_version_info", "Proxmox VE version info", &labels);
        info.add_metric(values, 1.0)?;
        Ok(vec![info])
    }
}

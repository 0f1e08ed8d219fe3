//! Metrics declared by operators in the datacenter notes.
//!
//! A fenced block under a `Prometheus metrics` heading in
//! `Datacenter > Summary > Notes` is read as exposition text:
//!
//! ````text
//! # Prometheus metrics
//! ```
//! foo{a="1"} 5
//! ```
//! ````
//!
//! becomes `pve_foo{a="1",__source="Datacenter > Notes"} 5`.

use pve_client::PveApi;
use pve_core::str_field;
use pve_metrics::{MetricFamily, parse_text};
use regex::Regex;
use tracing::debug;

use crate::error::CollectResult;
use crate::Collector;

const SOURCE_LABEL: &str = "__source";
const SOURCE: &str = "Datacenter > Notes";

pub struct ClusterCustomMetricsCollector<'a, A> {
    api: &'a A,
}

impl<'a, A: PveApi> ClusterCustomMetricsCollector<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }
}

impl<A: PveApi> Collector for ClusterCustomMetricsCollector<'_, A> {
    const NAME: &'static str = "custom";

    async fn collect(&self) -> CollectResult<Vec<MetricFamily>> {
        let options = self.api.cluster_options().await?;
        let notes = str_field(&options, "description").unwrap_or_default();
        custom_families(&notes)
    }
}

/// Extract, parse and relabel the notes block. No block, no families.
fn custom_families(notes: &str) -> CollectResult<Vec<MetricFamily>> {
    let pattern = Regex::new(r"(?s)#+\s*Prometheus metrics\s*```(.*?)```")?;
    let Some(block) = pattern.captures(notes).and_then(|c| c.get(1)) else {
        return Ok(Vec::new());
    };

    let mut families = parse_text(block.as_str())?;
    for family in &mut families {
        family.name = format!("pve_{}", family.name);
        for sample in &mut family.samples {
            sample.name = format!("pve_{}", sample.name);
            sample.set_label(SOURCE_LABEL, SOURCE);
        }
    }

    debug!(families = families.len(), "parsed custom metrics from notes");
    Ok(families)
}

//! Exporter self-metrics: scrape durations and failures per module.
//!
//! Uses atomics for the per-module counters behind a read-mostly map, so
//! concurrent scrapes only contend when a module is seen for the first time.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::family::{MetricFamily, MetricType, Sample};
use crate::prometheus::render_prometheus;

/// Per-module counters.
#[derive(Default)]
struct ModuleMetrics {
    /// Completed collections (successful or not).
    collections: AtomicU64,
    /// Sum of collection durations in microseconds.
    duration_micros: AtomicU64,
    /// Failed scrape requests.
    errors: AtomicU64,
}

/// Collects metrics about the exporter itself, served on `/metrics`.
#[derive(Default)]
pub struct ExporterMetrics {
    /// module name → counters.
    modules: RwLock<BTreeMap<String, Arc<ModuleMetrics>>>,
}

impl ExporterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    async fn module(&self, module: &str) -> Arc<ModuleMetrics> {
        if let Some(m) = self.modules.read().await.get(module) {
            return Arc::clone(m);
        }

        let mut modules = self.modules.write().await;
        let entry = modules.entry(module.to_string()).or_insert_with(|| {
            debug!(%module, "tracking collections for module");
            Arc::default()
        });
        Arc::clone(entry)
    }

    /// Record one finished collection for `module`.
    pub async fn observe_collection(&self, module: &str, elapsed: Duration) {
        let m = self.module(module).await;
        m.collections.fetch_add(1, Ordering::Relaxed);
        m.duration_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed scrape request for `module`.
    pub async fn record_error(&self, module: &str) {
        let m = self.module(module).await;
        m.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of errors recorded for `module` so far.
    pub async fn error_count(&self, module: &str) -> u64 {
        self.modules
            .read()
            .await
            .get(module)
            .map(|m| m.errors.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub async fn families(&self) -> Vec<MetricFamily> {
        let modules = self.modules.read().await;

        let mut duration = MetricFamily::with_labels(
            "pve_collection_duration_seconds",
            "Duration of collections by the PVE exporter",
            MetricType::Summary,
            &["module"],
        );
        let mut errors = MetricFamily::with_labels(
            "pve_request_errors_total",
            "Errors in requests to PVE exporter",
            MetricType::Counter,
            &["module"],
        );

        for (name, m) in modules.iter() {
            let count = m.collections.load(Ordering::Relaxed) as f64;
            let sum = m.duration_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
            let failures = m.errors.load(Ordering::Relaxed) as f64;

            duration
                .samples
                .push(module_sample("pve_collection_duration_seconds_count", name, count));
            duration
                .samples
                .push(module_sample("pve_collection_duration_seconds_sum", name, sum));
            errors
                .samples
                .push(module_sample("pve_request_errors_total", name, failures));
        }

        vec![duration, errors]
    }

    pub async fn render(&self) -> String {
        render_prometheus(&self.families().await)
    }
}

fn module_sample(name: &str, module: &str, value: f64) -> Sample {
    Sample {
        name: name.to_string(),
        labels: vec![("module".to_string(), module.to_string())],
        value,
        timestamp_ms: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_render_has_headers() {
        let metrics = ExporterMetrics::new();
        let output = metrics.render().await;
        assert!(output.contains("# TYPE pve_collection_duration_seconds summary"));
        assert!(output.contains("# TYPE pve_request_errors_total counter"));
        assert!(output.contains("# HELP pve_request_errors_total "));
        assert!(!output.contains("module="));
    }

    #[tokio::test]
    async fn observe_collection_accumulates() {
        let metrics = ExporterMetrics::new();
        metrics
            .observe_collection("default", Duration::from_millis(250))
            .await;
        metrics
            .observe_collection("default", Duration::from_millis(750))
            .await;

        let output = metrics.render().await;
        assert!(output.contains("pve_collection_duration_seconds_count{module=\"default\"} 2\n"));
        assert!(output.contains("pve_collection_duration_seconds_sum{module=\"default\"} 1\n"));
        assert!(output.contains(
            "# TYPE pve_request_errors_total counter\npve_request_errors_total{module=\"default\"} 0\n"
        ));
    }

    #[tokio::test]
    async fn errors_tracked_per_module() {
        let metrics = ExporterMetrics::new();
        metrics.record_error("lab").await;
        metrics.record_error("lab").await;
        metrics.record_error("default").await;

        assert_eq!(metrics.error_count("lab").await, 2);
        assert_eq!(metrics.error_count("default").await, 1);
        assert_eq!(metrics.error_count("unknown").await, 0);
    }

    #[tokio::test]
    async fn modules_render_in_name_order() {
        let metrics = ExporterMetrics::new();
        metrics.record_error("zeta").await;
        metrics.record_error("alpha").await;

        let output = metrics.render().await;
        let alpha = output.find("module=\"alpha\"").unwrap();
        let zeta = output.find("module=\"zeta\"").unwrap();
        assert!(alpha < zeta);
    }
}

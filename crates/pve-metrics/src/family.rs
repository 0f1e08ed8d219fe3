//! Metric families, samples, and the per-scrape registry.

use crate::error::{MetricError, MetricResult};
use crate::prometheus::render_prometheus;

/// Prometheus metric type as written on a `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Untyped,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
            MetricType::Untyped => "untyped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "counter" => Some(MetricType::Counter),
            "gauge" => Some(MetricType::Gauge),
            "histogram" => Some(MetricType::Histogram),
            "summary" => Some(MetricType::Summary),
            "untyped" | "unknown" => Some(MetricType::Untyped),
            _ => None,
        }
    }
}

/// A single time series value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
    /// Milliseconds since the epoch, when the source supplied one.
    pub timestamp_ms: Option<i64>,
}

impl Sample {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, replacing an existing label of that name.
    pub fn set_label(&mut self, key: &str, value: &str) {
        match self.labels.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.labels.push((key.to_string(), value.to_string())),
        }
    }
}

/// A named, typed group of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricType,
    label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// A family with no fixed label schema, as produced by the parser.
    pub fn new(name: impl Into<String>, help: impl Into<String>, kind: MetricType) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind,
            label_names: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// A gauge family whose samples all carry exactly `labels`.
    pub fn gauge<L: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[L],
    ) -> Self {
        Self::with_labels(name, help, MetricType::Gauge, labels)
    }

    pub fn with_labels<L: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricType,
        labels: &[L],
    ) -> Self {
        let mut family = Self::new(name, help, kind);
        family.label_names = labels.iter().map(|l| l.as_ref().to_string()).collect();
        family
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Add a sample named after the family, one value per declared label.
    pub fn add_metric<V: Into<String>>(
        &mut self,
        values: impl IntoIterator<Item = V>,
        value: f64,
    ) -> MetricResult<()> {
        let name = self.name.clone();
        self.add_sample(name, values, value)
    }

    /// Add a sample with an explicit name (e.g. `<family>_sum`).
    pub fn add_sample<V: Into<String>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        value: f64,
    ) -> MetricResult<()> {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.label_names.len() {
            return Err(MetricError::LabelCount {
                family: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            });
        }

        let labels = self.label_names.iter().cloned().zip(values).collect();
        self.samples.push(Sample {
            name: name.into(),
            labels,
            value,
            timestamp_ms: None,
        });
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-scrape collection of families, rendered once at the end.
#[derive(Debug, Default)]
pub struct Registry {
    families: Vec<MetricFamily>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, families: impl IntoIterator<Item = MetricFamily>) {
        self.families.extend(families);
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    pub fn render(&self) -> String {
        render_prometheus(&self.families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_metric_zips_schema() {
        let mut family = MetricFamily::gauge("pve_up", "help", &["id"]);
        family.add_metric(["node/pve1"], 1.0).unwrap();

        assert_eq!(family.samples.len(), 1);
        assert_eq!(family.samples[0].name, "pve_up");
        assert_eq!(family.samples[0].label("id"), Some("node/pve1"));
    }

    #[test]
    fn add_metric_rejects_wrong_label_count() {
        let mut family = MetricFamily::gauge("pve_memory_size_bytes", "help", &["id", "node", "type"]);
        let err = family.add_metric(["qemu/100", "pve1"], 1.0).unwrap_err();
        assert!(matches!(
            err,
            MetricError::LabelCount { expected: 3, got: 2, .. }
        ));
        assert!(family.is_empty());
    }

    #[test]
    fn set_label_overrides_existing() {
        let mut sample = Sample {
            name: "x".into(),
            labels: vec![("a".into(), "1".into()), ("b".into(), "2".into())],
            value: 0.0,
            timestamp_ms: None,
        };
        sample.set_label("a", "9");
        sample.set_label("c", "3");
        assert_eq!(
            sample.labels,
            vec![
                ("a".to_string(), "9".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = Registry::new();
        registry.register([MetricFamily::gauge("b", "", &["id"])]);
        registry.register(vec![
            MetricFamily::gauge("a", "", &["id"]),
            MetricFamily::gauge("c", "", &["id"]),
        ]);
        let names: Vec<&str> = registry.families().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn metric_type_round_trip() {
        for kind in [
            MetricType::Counter,
            MetricType::Gauge,
            MetricType::Histogram,
            MetricType::Summary,
            MetricType::Untyped,
        ] {
            assert_eq!(MetricType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MetricType::parse("bogus"), None);
    }
}

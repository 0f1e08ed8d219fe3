//! Prometheus text exposition format.
//!
//! Renders metric families into the Prometheus text exposition format
//! (version 0.0.4) for scraping by a Prometheus server or compatible agent.

use std::fmt::Write;

use crate::family::{MetricFamily, Sample};

/// Content type served alongside rendered exposition text.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render families in order, each preceded by its HELP and TYPE lines.
///
/// The HELP line is omitted when a family carries no help text.
pub fn render_prometheus(families: &[MetricFamily]) -> String {
    let mut out = String::new();

    for family in families {
        if !family.help.is_empty() {
            let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
        }
        let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
        for sample in &family.samples {
            write_sample(&mut out, sample);
        }
    }

    out
}

fn write_sample(out: &mut String, sample: &Sample) {
    out.push_str(&sample.name);
    if !sample.labels.is_empty() {
        out.push('{');
        for (i, (key, value)) in sample.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{key}=\"{}\"", escape_label_value(value));
        }
        out.push('}');
    }
    let _ = write!(out, " {}", format_value(sample.value));
    if let Some(ts) = sample.timestamp_ms {
        let _ = write!(out, " {ts}");
    }
    out.push('\n');
}

/// Format a sample value the way Prometheus parses it back.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{value}")
    }
}

fn escape_help(s: &str) -> String {
    s.replace('\\', r"\\").replace('\n', r"\n")
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', r"\\")
        .replace('"', "\\\"")
        .replace('\n', r"\n")
}

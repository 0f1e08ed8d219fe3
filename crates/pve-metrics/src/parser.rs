//! Prometheus text exposition parser.
//!
//! Reads the same grammar [`render_prometheus`](crate::render_prometheus)
//! writes: `# HELP` / `# TYPE` lines followed by
//! `name{label="value",...} value [timestamp]` samples. Samples are grouped
//! into the family declared by the preceding TYPE line when their name
//! belongs to it (`_total`, `_sum`, `_bucket`, ... suffixes included);
//! otherwise they start a new untyped family. Counter families come back
//! under their `_total` name.

use crate::error::{MetricError, MetricResult};
use crate::family::{MetricFamily, MetricType, Sample};

/// Parse exposition text into families, in order of appearance.
pub fn parse_text(text: &str) -> MetricResult<Vec<MetricFamily>> {
    let mut families = Vec::new();
    let mut current: Option<MetricFamily> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let mut parts = comment.trim_start().splitn(3, char::is_whitespace);
            let keyword = parts.next().unwrap_or_default();
            if keyword != "HELP" && keyword != "TYPE" {
                continue;
            }

            let name = parts.next().unwrap_or_default();
            if !is_metric_name(name) {
                return Err(parse_err(line_no, format!("invalid metric name {name:?}")));
            }
            let rest = parts.next().unwrap_or_default().trim();

            if current.as_ref().is_none_or(|f| f.name != name) {
                if let Some(done) = current.take() {
                    push_family(&mut families, done);
                }
                current = Some(MetricFamily::new(name, "", MetricType::Untyped));
            }
            let Some(family) = current.as_mut() else {
                continue;
            };

            if keyword == "HELP" {
                family.help = unescape_help(rest);
            } else {
                family.kind = MetricType::parse(rest)
                    .ok_or_else(|| parse_err(line_no, format!("unknown metric type {rest:?}")))?;
            }
            continue;
        }

        let sample = parse_sample(line).map_err(|reason| parse_err(line_no, reason))?;
        let belongs = current
            .as_ref()
            .is_some_and(|family| accepts_sample(family, &sample.name));
        if !belongs {
            if let Some(done) = current.take() {
                push_family(&mut families, done);
            }
            current = Some(MetricFamily::new(sample.name.clone(), "", MetricType::Untyped));
        }
        if let Some(family) = current.as_mut() {
            family.samples.push(sample);
        }
    }

    if let Some(done) = current {
        push_family(&mut families, done);
    }
    Ok(families)
}

/// Counters are exposed under their `_total` name so the TYPE line names
/// the series; `_created` samples move to a gauge family of their own.
fn push_family(families: &mut Vec<MetricFamily>, mut family: MetricFamily) {
    if family.kind != MetricType::Counter || family.name.ends_with("_total") {
        families.push(family);
        return;
    }

    let total = format!("{}_total", family.name);
    let created_name = format!("{}_created", family.name);
    let (created, counted): (Vec<Sample>, Vec<Sample>) = family
        .samples
        .into_iter()
        .partition(|sample| sample.name == created_name);

    family.samples = counted
        .into_iter()
        .map(|mut sample| {
            sample.name = total.clone();
            sample
        })
        .collect();
    family.name = total;
    families.push(family);

    if !created.is_empty() {
        let mut created_family = MetricFamily::new(created_name, "", MetricType::Gauge);
        created_family.samples = created;
        families.push(created_family);
    }
}

fn parse_err(line: usize, reason: String) -> MetricError {
    MetricError::Parse { line, reason }
}

/// Whether `sample_name` is a series of `family` given its declared type.
fn accepts_sample(family: &MetricFamily, sample_name: &str) -> bool {
    let suffixes: &[&str] = match family.kind {
        MetricType::Counter => &["", "_total", "_created"],
        MetricType::Summary => &["", "_count", "_sum", "_created"],
        MetricType::Histogram => &["_count", "_sum", "_bucket", "_created"],
        MetricType::Gauge | MetricType::Untyped => &[""],
    };
    sample_name
        .strip_prefix(family.name.as_str())
        .is_some_and(|suffix| suffixes.contains(&suffix))
}

fn parse_sample(line: &str) -> Result<Sample, String> {
    let split = line
        .find(|c: char| c == '{' || c.is_whitespace())
        .ok_or_else(|| "sample has no value".to_string())?;
    let (name, mut rest) = line.split_at(split);
    if !is_metric_name(name) {
        return Err(format!("invalid metric name {name:?}"));
    }

    let mut labels = Vec::new();
    if let Some(after_brace) = rest.strip_prefix('{') {
        let (parsed, remainder) = parse_labels(after_brace)?;
        labels = parsed;
        rest = remainder;
    }

    let mut fields = rest.split_whitespace();
    let value = fields
        .next()
        .ok_or_else(|| "sample has no value".to_string())
        .and_then(parse_value)?;
    let timestamp_ms = fields
        .next()
        .map(|ts| ts.parse::<i64>().map_err(|_| format!("invalid timestamp {ts:?}")))
        .transpose()?;
    if let Some(extra) = fields.next() {
        return Err(format!("unexpected trailing token {extra:?}"));
    }

    Ok(Sample {
        name: name.to_string(),
        labels,
        value,
        timestamp_ms,
    })
}

/// Parse `a="1",b="2"}` and return the labels plus the text after `}`.
fn parse_labels(input: &str) -> Result<(Vec<(String, String)>, &str), String> {
    let mut labels = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix('}') {
            return Ok((labels, after));
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| "label without value".to_string())?;
        let key = rest[..eq].trim();
        if !is_label_name(key) {
            return Err(format!("invalid label name {key:?}"));
        }
        rest = rest[eq + 1..].trim_start();
        rest = rest
            .strip_prefix('"')
            .ok_or_else(|| format!("label {key:?} value is not quoted"))?;

        let mut value = String::new();
        let mut chars = rest.char_indices();
        let end = loop {
            match chars.next() {
                Some((i, '"')) => break i,
                Some((_, '\\')) => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, c @ ('\\' | '"'))) => value.push(c),
                    Some((_, c)) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => return Err(format!("unterminated value for label {key:?}")),
                },
                Some((_, c)) => value.push(c),
                None => return Err(format!("unterminated value for label {key:?}")),
            }
        };
        labels.push((key.to_string(), value));

        rest = rest[end + 1..].trim_start();
        if let Some(after) = rest.strip_prefix(',') {
            rest = after;
        } else if !rest.starts_with('}') {
            return Err("expected ',' or '}' after label".to_string());
        }
    }
}

fn parse_value(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("invalid sample value {s:?}"))
}

fn unescape_help(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn is_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

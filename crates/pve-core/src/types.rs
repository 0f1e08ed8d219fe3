//! Shared types for records returned by the PVE API.

use std::fmt;

use serde_json::Value;

/// One API entity (node, guest, storage, cluster) as a field → scalar map.
///
/// Keys keep the order in which the API sent them.
pub type Record = serde_json::Map<String, Value>;

/// Guest flavours managed by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuestKind {
    Qemu,
    Lxc,
}

impl GuestKind {
    pub const ALL: [GuestKind; 2] = [GuestKind::Qemu, GuestKind::Lxc];

    pub fn as_str(self) -> &'static str {
        match self {
            GuestKind::Qemu => "qemu",
            GuestKind::Lxc => "lxc",
        }
    }
}

impl fmt::Display for GuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which collectors run for a scrape. The notes collector has no toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorsOptions {
    pub status: bool,
    pub version: bool,
    pub node: bool,
    pub cluster: bool,
    pub resources: bool,
    pub config: bool,
    pub volumes: bool,
}

impl Default for CollectorsOptions {
    fn default() -> Self {
        Self {
            status: true,
            version: true,
            node: true,
            cluster: true,
            resources: true,
            config: true,
            volumes: true,
        }
    }
}

impl CollectorsOptions {
    /// Every toggle off; only the notes collector will run.
    pub fn none() -> Self {
        Self {
            status: false,
            version: false,
            node: false,
            cluster: false,
            resources: false,
            config: false,
            volumes: false,
        }
    }
}

/// Render a record value as a label value.
///
/// Strings pass through, numbers use their JSON form, booleans become
/// `1`/`0` and null becomes the empty string.
pub fn label_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => u8::from(*b).to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Look up `key` in a record as a label value; absent keys yield `""`.
pub fn label_of(record: &Record, key: &str) -> String {
    record.get(key).map(label_value).unwrap_or_default()
}

/// Coerce a record value into a sample value.
///
/// Returns `None` for values with no numeric reading.
pub fn gauge_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// String field accessor; numbers are accepted and stringified.
pub fn str_field<'a>(record: &'a Record, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match record.get(key)? {
        Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(std::borrow::Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// Truthiness of a flag field (`1`, `true`, non-zero numbers).
pub fn flag_field(record: &Record, key: &str) -> bool {
    record
        .get(key)
        .and_then(gauge_value)
        .is_some_and(|v| v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn label_value_coercion() {
        assert_eq!(label_value(&json!("pve1")), "pve1");
        assert_eq!(label_value(&json!(0)), "0");
        assert_eq!(label_value(&json!(0.05)), "0.05");
        assert_eq!(label_value(&json!(true)), "1");
        assert_eq!(label_value(&Value::Null), "");
    }

    #[test]
    fn gauge_value_coercion() {
        assert_eq!(gauge_value(&json!(1073741824u64)), Some(1073741824.0));
        assert_eq!(gauge_value(&json!(false)), Some(0.0));
        assert_eq!(gauge_value(&json!("12")), Some(12.0));
        assert_eq!(gauge_value(&json!("running")), None);
        assert_eq!(gauge_value(&json!([1])), None);
    }

    #[test]
    fn record_preserves_key_order() {
        let rec: Record =
            serde_json::from_str(r#"{"type":"cluster","quorate":1,"name":"pvec","nodes":2}"#)
                .unwrap();
        let keys: Vec<&str> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys, ["type", "quorate", "name", "nodes"]);
    }

    #[test]
    fn field_helpers() {
        let rec = record(json!({"vmid": 101, "online": 1, "node": "pve1", "quorate": 0}));
        assert_eq!(str_field(&rec, "vmid").as_deref(), Some("101"));
        assert_eq!(str_field(&rec, "node").as_deref(), Some("pve1"));
        assert!(str_field(&rec, "missing").is_none());
        assert!(flag_field(&rec, "online"));
        assert!(!flag_field(&rec, "quorate"));
        assert!(!flag_field(&rec, "missing"));
        assert_eq!(label_of(&rec, "missing"), "");
    }

    #[test]
    fn guest_kind_display() {
        assert_eq!(GuestKind::Qemu.to_string(), "qemu");
        assert_eq!(GuestKind::ALL.map(GuestKind::as_str), ["qemu", "lxc"]);
    }

    #[test]
    fn options_default_enables_everything() {
        let opts = CollectorsOptions::default();
        assert!(opts.status && opts.version && opts.node && opts.cluster);
        assert!(opts.resources && opts.config && opts.volumes);
        assert!(!CollectorsOptions::none().status);
    }
}

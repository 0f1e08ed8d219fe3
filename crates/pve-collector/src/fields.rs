//! Typed field access on API records, failing with [`CollectError`].

use std::borrow::Cow;

use pve_core::{Record, gauge_value, str_field};

use crate::error::{CollectError, CollectResult};

/// A string (or numeric) field that must be present.
pub(crate) fn required<'a>(record: &'a Record, field: &str, entity: &str) -> CollectResult<Cow<'a, str>> {
    str_field(record, field).ok_or_else(|| CollectError::MissingField {
        entity: entity.to_string(),
        field: field.to_string(),
    })
}

/// A field that must hold a numeric reading.
pub(crate) fn numeric(record: &Record, field: &str, entity: &str) -> CollectResult<f64> {
    let value = record.get(field).ok_or_else(|| CollectError::MissingField {
        entity: entity.to_string(),
        field: field.to_string(),
    })?;
    gauge_value(value).ok_or_else(|| CollectError::NonNumeric {
        entity: entity.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Best-effort name for a record in error messages.
pub(crate) fn describe(record: &Record) -> String {
    str_field(record, "id")
        .or_else(|| str_field(record, "node"))
        .or_else(|| str_field(record, "volid"))
        .map(Cow::into_owned)
        .unwrap_or_else(|| "record".to_string())
}

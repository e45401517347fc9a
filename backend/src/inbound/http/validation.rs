//! Shared validation helpers for the HTTP adapter.
//!
//! Validation failures become `400` responses whose `details` object
//! names the offending field and a stable machine-readable code, so
//! clients can render per-field messages.

use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    Required,
    Blank,
    InvalidId,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            FieldErrorCode::Required => "required",
            FieldErrorCode::Blank => "blank",
            FieldErrorCode::InvalidId => "invalid_id",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: FieldErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_error_at(
    field: FieldName,
    message: String,
    code: FieldErrorCode,
    index: usize,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
        "index": index,
        "value": value,
    }))
}

/// Require a present, non-blank text field. Returns the trimmed-checked
/// original value; surrounding whitespace is preserved for storage.
pub(crate) fn required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let name = field.as_str();
    let value = value.ok_or_else(|| {
        field_error(
            field,
            format!("missing required field: {name}"),
            FieldErrorCode::Required,
        )
    })?;
    if value.trim().is_empty() {
        return Err(field_error(
            field,
            format!("{name} must not be blank"),
            FieldErrorCode::Blank,
        ));
    }
    Ok(value)
}

/// Require a present value of any type.
pub(crate) fn required_value<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    let name = field.as_str();
    value.ok_or_else(|| {
        field_error(
            field,
            format!("missing required field: {name}"),
            FieldErrorCode::Required,
        )
    })
}

/// Parse a comma-separated id list query parameter, e.g. `tags=3,7`.
/// Empty segments and non-numeric values are per-index failures.
pub(crate) fn parse_id_csv(raw: &str, field: FieldName) -> Result<Vec<i64>, Error> {
    raw.split(',')
        .enumerate()
        .map(|(index, segment)| {
            let segment = segment.trim();
            segment.parse::<i64>().map_err(|_| {
                field_error_at(
                    field,
                    format!("{} must be a comma-separated list of ids", field.as_str()),
                    FieldErrorCode::InvalidId,
                    index,
                    segment,
                )
            })
        })
        .collect()
}

/// Interpret the `assigned_only` query flag. `1` and `true` enable it;
/// anything else, including absence, leaves it off.
pub(crate) fn assigned_only_flag(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true"))
}

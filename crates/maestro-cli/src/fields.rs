//! Parsing of `key=value` field arguments.

use chrono::{DateTime, Utc};

use maestro_core::types::validate_field_name;
use maestro_core::PropertyValue;

/// Parse one `--field key=value` argument.
pub fn parse_field(raw: &str) -> Result<(String, PropertyValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected key=value, got {raw:?}"))?;
    let key = key.trim();
    validate_field_name(key).map_err(|e| e.to_string())?;
    Ok((key.to_string(), parse_literal(value)))
}

/// Interpret a literal as bool, integer, float, RFC 3339 timestamp, or text.
pub fn parse_literal(raw: &str) -> PropertyValue {
    match raw {
        "true" => return PropertyValue::Bool(true),
        "false" => return PropertyValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return PropertyValue::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return PropertyValue::Float(f);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return PropertyValue::Timestamp(ts.with_timezone(&Utc));
    }
    PropertyValue::String(raw.to_string())
}

//! Text form of the filter settings
//!
//! Filters are stored as a flat JSON object with one numeric entry per
//! parameter. Decoding never fails: a blob that cannot be read comes back
//! as the default filters.

use serde_json::{Map, Value};
use tracing::debug;

use super::filters::{FilterKey, FilterModel};

/// Convert filters to their canonical JSON text
pub fn serialize(filters: &FilterModel) -> String {
    to_value(filters).to_string()
}

/// Parse filters from JSON text, falling back to the defaults
///
/// - Missing fields take their default value
/// - Unknown fields are ignored
/// - Out-of-range values are clamped
/// - Anything else (not an object, a non-integer or negative value) resets
///   the whole blob to default
pub fn deserialize(text: &str) -> FilterModel {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => from_value(&value).unwrap_or_else(|| {
            debug!(text, "Filter settings rejected, using defaults");
            FilterModel::default()
        }),
        Err(e) => {
            debug!(error = %e, "Filter settings are not valid JSON, using defaults");
            FilterModel::default()
        }
    }
}

/// Flat JSON object for the given filters
pub fn to_value(filters: &FilterModel) -> Value {
    let map: Map<String, Value> = FilterKey::ALL
        .iter()
        .map(|&key| (key.name().to_string(), Value::from(filters.get(key))))
        .collect();
    Value::Object(map)
}

/// Read filters from an already-parsed JSON value
///
/// Returns `None` when the value violates the field policy of [`deserialize`].
pub fn from_value(value: &Value) -> Option<FilterModel> {
    let object = value.as_object()?;
    let mut filters = FilterModel::default();

    for key in FilterKey::ALL {
        let Some(field) = object.get(key.name()) else {
            continue;
        };
        let raw = field.as_u64()?;
        filters.set(key, u16::try_from(raw).unwrap_or(u16::MAX));
    }

    Some(filters)
}

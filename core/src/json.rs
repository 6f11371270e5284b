//! Pretty-printing laid out the way a browser's `JSON.stringify(v, null, 2)`
//! lays it out.
//!
//! Two things differ from plain `serde_json::to_string_pretty`: floats with
//! no fractional part print as integers (`1.0` is `1`), and object keys that
//! are array indices come first in ascending numeric order, ahead of the
//! other keys in document order.

use serde_json::{Map, Value};

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// `value` with numbers and key order normalised, then pretty-printed.
pub fn to_pretty(value: Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&normalize(value))
}

/// Numbers and key order as `JSON.parse` would leave them.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Number(n) => match integral(&n) {
            Some(i) => Value::from(i),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(reorder(map)),
        other => other,
    }
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER).then_some(f as i64)
}

fn reorder(map: Map<String, Value>) -> Map<String, Value> {
    let (mut indexed, named): (Vec<_>, Vec<_>) =
        map.into_iter().partition(|(key, _)| array_index(key).is_some());
    indexed.sort_by_key(|(key, _)| array_index(key));
    indexed
        .into_iter()
        .chain(named)
        .map(|(key, value)| (key, normalize(value)))
        .collect()
}

/// Canonical array index: digits only, no leading zero, below `2^32 - 1`.
fn array_index(key: &str) -> Option<u32> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if !canonical {
        return None;
    }
    key.parse::<u32>().ok().filter(|&i| i != u32::MAX)
}

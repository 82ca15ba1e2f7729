//! Property path resolution against JSON documents

use crate::pattern::PropertyPath;
use serde_json::Value;

/// Resolve `path` against `document` by sequential property descent.
///
/// Returns `None` as soon as a segment cannot be followed: a missing property, an
/// out-of-range array index, or descent into a scalar or `null`. Array segments are
/// addressed by their decimal index (`tags.0`).
pub fn resolve<'a>(document: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(document, |current, segment| step(current, segment))
}

/// Convenience wrapper that parses `path` first.
pub fn resolve_str<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    resolve(document, &PropertyPath::parse(path))
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    // "01" and "+1" are property names, not indexes.
    if segment.is_empty()
        || !segment.bytes().all(|b| b.is_ascii_digit())
        || (segment.len() > 1 && segment.starts_with('0'))
    {
        return None;
    }
    segment.parse().ok()
}

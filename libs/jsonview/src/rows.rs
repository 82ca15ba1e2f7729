//! Row generation
//!
//! Turns interpreted key/value results into the ordered list of index rows for one
//! document. Three row-shaping annotations interact here:
//!
//! - `Guard` filters: any failing guard in a composite key drops every row; passing
//!   guards are consumed and never appear in the key.
//! - `Flattenable` widens every key in place (row count unchanged).
//! - `Fanout` multiplies rows. Existing rows are the outer loop and fan-out elements the
//!   inner loop, so expansions of one row stay contiguous.
//!
//! Guards are evaluated before any expansion. An empty fan-out collapses the row set.

use crate::value::InterpretedValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One index row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: Value,
    pub value: Value,
}

impl Row {
    pub fn new(key: Value, value: Value) -> Self {
        Self { key, value }
    }
}

/// An interpreted key: one component, or one result per position of a composite key.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretedKey {
    Single(InterpretedValue),
    Composite(Vec<InterpretedValue>),
}

/// Produce the rows for one document.
///
/// `value` is `None` when the view has no value pattern; rows then carry `null`.
pub fn generate(key: InterpretedKey, value: Option<InterpretedValue>) -> Vec<Row> {
    let (value, value_fanout) = match value {
        Some(InterpretedValue::Fanout(items)) => (Value::Null, Some(items)),
        Some(other) => (other.into_payload(), None),
        None => (Value::Null, None),
    };

    let rows = match key {
        InterpretedKey::Single(key) => single_key_rows(key, &value),
        InterpretedKey::Composite(parts) => composite_key_rows(parts, &value),
    };

    match value_fanout {
        Some(items) => fan_out_values(rows, &items),
        None => rows,
    }
}

fn single_key_rows(key: InterpretedValue, value: &Value) -> Vec<Row> {
    match key {
        InterpretedValue::Fanout(items) => items
            .into_iter()
            .map(|item| Row::new(item, value.clone()))
            .collect(),
        InterpretedValue::Guard { passes: false, .. } => Vec::new(),
        other => vec![Row::new(other.into_payload(), value.clone())],
    }
}

fn composite_key_rows(parts: Vec<InterpretedValue>, value: &Value) -> Vec<Row> {
    let mut components = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            InterpretedValue::Guard { passes: false, .. } => return Vec::new(),
            InterpretedValue::Guard { passes: true, .. } => {}
            other => components.push(other),
        }
    }

    let mut keys: Vec<Vec<Value>> = vec![Vec::with_capacity(components.len())];
    for component in components {
        match component {
            InterpretedValue::Fanout(items) => {
                keys = fan_out_keys(&keys, &items);
                if keys.is_empty() {
                    return Vec::new();
                }
            }
            InterpretedValue::Flattenable(items) => {
                for key in &mut keys {
                    key.extend(items.iter().cloned());
                }
            }
            scalar => {
                let scalar = scalar.into_payload();
                for key in &mut keys {
                    key.push(scalar.clone());
                }
            }
        }
    }

    keys.into_iter()
        .map(|key| Row::new(Value::Array(key), value.clone()))
        .collect()
}

fn fan_out_keys(prefixes: &[Vec<Value>], items: &[Value]) -> Vec<Vec<Value>> {
    let mut next = Vec::with_capacity(prefixes.len() * items.len());
    for prefix in prefixes {
        for item in items {
            let mut key = prefix.clone();
            key.push(item.clone());
            next.push(key);
        }
    }
    next
}

fn fan_out_values(rows: Vec<Row>, items: &[Value]) -> Vec<Row> {
    let mut next = Vec::with_capacity(rows.len() * items.len());
    for row in rows {
        for item in items {
            next.push(Row::new(row.key.clone(), item.clone()));
        }
    }
    next
}

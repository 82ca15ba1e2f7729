//! Results of evaluating a pattern against a document

use serde_json::Value;

/// Outcome of interpreting one pattern.
///
/// `Missing` and `Failed` both render as `null` in rows; they are kept apart so callers
/// can tell an absent property from a value that a transform could not handle.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretedValue {
    /// A scalar or structure with no row-shaping annotation.
    Plain(Value),
    /// A path that could not be fully resolved.
    Missing,
    /// A transform was applied to a value it could not interpret.
    Failed,
    /// One row per element (`splay`). May be empty.
    Fanout(Vec<Value>),
    /// A row filter (`emit`). `value` is the transformed value under test.
    Guard { value: Value, passes: bool },
    /// Elements inlined as separate key components (`flatten`). Never empty.
    Flattenable(Vec<Value>),
}

impl InterpretedValue {
    pub fn from_resolved(value: Option<&Value>) -> Self {
        match value {
            Some(v) => InterpretedValue::Plain(v.clone()),
            None => InterpretedValue::Missing,
        }
    }

    /// Whether there is no underlying value at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, InterpretedValue::Missing | InterpretedValue::Failed)
    }

    /// The underlying JSON with any annotation removed; `null` when absent.
    pub fn payload(&self) -> Value {
        self.clone().into_payload()
    }

    pub fn into_payload(self) -> Value {
        match self {
            InterpretedValue::Plain(v) => v,
            InterpretedValue::Missing | InterpretedValue::Failed => Value::Null,
            InterpretedValue::Fanout(items) | InterpretedValue::Flattenable(items) => {
                Value::Array(items)
            }
            InterpretedValue::Guard { value, .. } => value,
        }
    }

    /// Drop the annotation but keep absence distinguishable.
    pub(crate) fn strip(self) -> Self {
        match self {
            InterpretedValue::Missing | InterpretedValue::Failed | InterpretedValue::Plain(_) => {
                self
            }
            other => InterpretedValue::Plain(other.into_payload()),
        }
    }
}

impl From<Value> for InterpretedValue {
    fn from(value: Value) -> Self {
        InterpretedValue::Plain(value)
    }
}

/// Truthiness used by `emit` guards without `equals`.
///
/// `false`, `null`, `0`, `""` and absent values are falsy; every array and object is
/// truthy, empty or not.
pub fn is_truthy(value: &InterpretedValue) -> bool {
    match value {
        InterpretedValue::Missing | InterpretedValue::Failed => false,
        InterpretedValue::Plain(v) | InterpretedValue::Guard { value: v, .. } => json_truthy(v),
        InterpretedValue::Fanout(_) | InterpretedValue::Flattenable(_) => true,
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

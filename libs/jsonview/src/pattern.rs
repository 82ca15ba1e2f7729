//! Pattern tree for JSON views
//!
//! A view is described by a small JSON grammar:
//!
//! ```text
//! Pattern        := string | AccessPattern
//! AccessPattern  := { access: Pattern, transform?: TransformKind,
//!                      splay?: bool, emit?: bool, equals?: any,
//!                      invert?: bool, flatten?: bool }
//! KeyPattern     := Pattern | Pattern[]
//! ViewSpec       := { key: KeyPattern, value?: Pattern, reduce?: any }
//! ```
//!
//! Parsing is strict: anything outside the grammar is rejected with the JSON location
//! of the offending node (e.g. `key[1].access.transform`). Serialization renders the
//! exact same grammar, omitting defaulted fields, so a parsed view round-trips.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const ACCESS_FIELDS: [&str; 7] = [
    "access",
    "transform",
    "splay",
    "emit",
    "equals",
    "invert",
    "flatten",
];

/// A dotted property path, split once at parse time.
///
/// `.` separates segments; `\.` is a literal dot inside a segment. Any other backslash
/// is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<String>,
}

impl PropertyPath {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&'.') => {
                    chars.next();
                    current.push('.');
                }
                '.' => segments.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        segments.push(current);

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The path as written, escapes included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Un-escaped property names, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for PropertyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Named semantic transform applied to a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Date,
    Year,
    Month,
    YearMonth,
    Day,
    Time,
    Hour,
    Minute,
    DateTime,
    Words,
}

impl TransformKind {
    pub const ALL: [TransformKind; 10] = [
        TransformKind::Date,
        TransformKind::Year,
        TransformKind::Month,
        TransformKind::YearMonth,
        TransformKind::Day,
        TransformKind::Time,
        TransformKind::Hour,
        TransformKind::Minute,
        TransformKind::DateTime,
        TransformKind::Words,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Year => "year",
            Self::Month => "month",
            Self::YearMonth => "year-month",
            Self::Day => "day",
            Self::Time => "time",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::DateTime => "datetime",
            Self::Words => "words",
        }
    }

    /// Whether the transform reads calendar/clock components of a timestamp.
    pub fn is_temporal(&self) -> bool {
        !matches!(self, Self::Words)
    }
}

impl FromStr for TransformKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pattern node: either a bare path or a structured access descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Path(PropertyPath),
    Access(Box<AccessPattern>),
}

/// Structured access descriptor.
///
/// `access` is evaluated first; the remaining fields apply to its result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessPattern {
    pub access: Pattern,
    pub transform: Option<TransformKind>,
    pub splay: bool,
    pub emit: bool,
    /// `Some(Value::Null)` is an explicit `equals: null`, distinct from `None`.
    pub equals: Option<Value>,
    pub invert: bool,
    pub flatten: bool,
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::Path(PropertyPath::parse(""))
    }
}

impl AccessPattern {
    pub fn new(access: impl Into<Pattern>) -> Self {
        Self {
            access: access.into(),
            ..Default::default()
        }
    }

    pub fn transform(mut self, kind: TransformKind) -> Self {
        self.transform = Some(kind);
        self
    }

    pub fn splay(mut self) -> Self {
        self.splay = true;
        self
    }

    pub fn emit(mut self) -> Self {
        self.emit = true;
        self
    }

    pub fn equals(mut self, value: Value) -> Self {
        self.equals = Some(value);
        self
    }

    pub fn invert(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// True when the descriptor neither transforms nor annotates its input.
    pub fn is_passthrough(&self) -> bool {
        self.transform.is_none() && !self.splay && !self.emit && !self.flatten
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Pattern::Path(PropertyPath::parse(raw))
    }
}

impl From<PropertyPath> for Pattern {
    fn from(path: PropertyPath) -> Self {
        Pattern::Path(path)
    }
}

impl From<AccessPattern> for Pattern {
    fn from(access: AccessPattern) -> Self {
        Pattern::Access(Box::new(access))
    }
}

/// A single key component or a composite (multi-part) key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyPattern {
    Single(Pattern),
    Composite(Vec<Pattern>),
}

impl From<Pattern> for KeyPattern {
    fn from(pattern: Pattern) -> Self {
        KeyPattern::Single(pattern)
    }
}

impl From<&str> for KeyPattern {
    fn from(raw: &str) -> Self {
        KeyPattern::Single(raw.into())
    }
}

impl From<AccessPattern> for KeyPattern {
    fn from(access: AccessPattern) -> Self {
        KeyPattern::Single(access.into())
    }
}

impl From<Vec<Pattern>> for KeyPattern {
    fn from(parts: Vec<Pattern>) -> Self {
        KeyPattern::Composite(parts)
    }
}

/// A complete view: key derivation, optional value derivation, opaque reduce.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub key: KeyPattern,
    pub value: Option<Pattern>,
    pub reduce: Option<Value>,
}

impl ViewSpec {
    pub fn new(key: impl Into<KeyPattern>) -> Self {
        Self {
            key: key.into(),
            value: None,
            reduce: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Pattern>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_reduce(mut self, reduce: Value) -> Self {
        self.reduce = Some(reduce);
        self
    }
}

// ============================================================================
// Parsing
// ============================================================================

impl Pattern {
    pub fn from_json(value: &Value) -> Result<Self> {
        parse_pattern(value, "pattern")
    }

    pub fn to_json(&self) -> Value {
        match self {
            Pattern::Path(path) => Value::String(path.as_str().to_string()),
            Pattern::Access(access) => access.to_json(),
        }
    }
}

impl AccessPattern {
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("access".into(), self.access.to_json());
        if let Some(kind) = self.transform {
            obj.insert("transform".into(), Value::String(kind.as_str().into()));
        }
        for (name, set) in [
            ("splay", self.splay),
            ("emit", self.emit),
            ("invert", self.invert),
            ("flatten", self.flatten),
        ] {
            if set {
                obj.insert(name.into(), Value::Bool(true));
            }
        }
        if let Some(equals) = &self.equals {
            obj.insert("equals".into(), equals.clone());
        }
        Value::Object(obj)
    }
}

impl KeyPattern {
    pub fn from_json(value: &Value) -> Result<Self> {
        parse_key(value, "key")
    }

    pub fn to_json(&self) -> Value {
        match self {
            KeyPattern::Single(pattern) => pattern.to_json(),
            KeyPattern::Composite(parts) => {
                Value::Array(parts.iter().map(Pattern::to_json).collect())
            }
        }
    }
}

impl ViewSpec {
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(obj) = value else {
            return Err(Error::invalid("view", "expected an object"));
        };

        if let Some(unknown) = obj
            .keys()
            .find(|k| !matches!(k.as_str(), "key" | "value" | "reduce"))
        {
            return Err(Error::invalid(
                "view",
                format!("unexpected field '{}' (expected key, value, reduce)", unknown),
            ));
        }

        let key = obj
            .get("key")
            .ok_or_else(|| Error::invalid("view", "missing required field 'key'"))?;

        let value = match obj.get("value") {
            None | Some(Value::Null) => None,
            Some(v) => Some(parse_pattern(v, "value")?),
        };

        Ok(Self {
            key: parse_key(key, "key")?,
            value,
            reduce: obj.get("reduce").filter(|r| !r.is_null()).cloned(),
        })
    }

    /// The key/value patterns only, without `reduce`.
    pub fn patterns_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("key".into(), self.key.to_json());
        if let Some(value) = &self.value {
            obj.insert("value".into(), value.to_json());
        }
        Value::Object(obj)
    }

    pub fn to_json(&self) -> Value {
        let mut json = self.patterns_json();
        if let (Some(reduce), Value::Object(obj)) = (&self.reduce, &mut json) {
            obj.insert("reduce".into(), reduce.clone());
        }
        json
    }
}

fn parse_key(value: &Value, location: &str) -> Result<KeyPattern> {
    match value {
        Value::Array(parts) => parts
            .iter()
            .enumerate()
            .map(|(i, part)| parse_pattern(part, &format!("{}[{}]", location, i)))
            .collect::<Result<Vec<_>>>()
            .map(KeyPattern::Composite),
        other => parse_pattern(other, location).map(KeyPattern::Single),
    }
}

fn parse_pattern(value: &Value, location: &str) -> Result<Pattern> {
    match value {
        Value::String(raw) => Ok(Pattern::Path(PropertyPath::parse(raw))),
        Value::Object(obj) => parse_access(obj, location).map(Pattern::from),
        other => Err(Error::invalid(
            location,
            format!(
                "expected a path string or an access object, got {}",
                json_type_name(other)
            ),
        )),
    }
}

fn parse_access(obj: &Map<String, Value>, location: &str) -> Result<AccessPattern> {
    if let Some(unknown) = obj.keys().find(|k| !ACCESS_FIELDS.contains(&k.as_str())) {
        return Err(Error::invalid(
            location,
            format!("unexpected field '{}' in access pattern", unknown),
        ));
    }

    let access = obj
        .get("access")
        .ok_or_else(|| Error::invalid(location, "access pattern is missing 'access'"))?;
    let access = parse_pattern(access, &format!("{}.access", location))?;

    let transform = match obj.get("transform") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => {
            Some(
                name.parse::<TransformKind>()
                    .map_err(|_| Error::UnknownTransform {
                        location: format!("{}.transform", location),
                        name: name.clone(),
                    })?,
            )
        }
        Some(other) => {
            return Err(Error::invalid(
                &format!("{}.transform", location),
                format!("expected a string, got {}", json_type_name(other)),
            ))
        }
    };

    let flag = |name: &str| -> Result<bool> {
        match obj.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(Error::invalid(
                &format!("{}.{}", location, name),
                format!("expected a boolean, got {}", json_type_name(other)),
            )),
        }
    };

    Ok(AccessPattern {
        access,
        transform,
        splay: flag("splay")?,
        emit: flag("emit")?,
        equals: obj.get("equals").cloned(),
        invert: flag("invert")?,
        flatten: flag("flatten")?,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Serde
// ============================================================================

macro_rules! json_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.to_json().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = Value::deserialize(deserializer)?;
                Self::from_json(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

json_serde!(Pattern);
json_serde!(KeyPattern);
json_serde!(ViewSpec);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_splits_on_unescaped_dots() {
        let path = PropertyPath::parse("foo.bar.baz");
        assert_eq!(path.segments(), ["foo", "bar", "baz"]);
    }

    #[test]
    fn test_path_escaped_dot_is_literal() {
        let path = PropertyPath::parse(r"foo\.bar");
        assert_eq!(path.segments(), ["foo.bar"]);
        assert_eq!(path.as_str(), r"foo\.bar");

        let path = PropertyPath::parse(r"a\.b.c");
        assert_eq!(path.segments(), ["a.b", "c"]);
    }

    #[test]
    fn test_path_other_backslashes_are_kept() {
        let path = PropertyPath::parse(r"a\b.c\");
        assert_eq!(path.segments(), [r"a\b", r"c\"]);
    }

    #[test]
    fn test_empty_path_is_single_empty_segment() {
        assert_eq!(PropertyPath::parse("").segments(), [""]);
        assert_eq!(PropertyPath::parse("a.").segments(), ["a", ""]);
    }

    #[test]
    fn test_transform_names_round_trip() {
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>(), Ok(kind));
        }
        assert!("week".parse::<TransformKind>().is_err());
    }

    #[test]
    fn test_parse_nested_access() {
        let pattern = Pattern::from_json(&json!({
            "access": { "access": "createdAt", "transform": "date" },
            "splay": true
        }))
        .unwrap();

        let expected: Pattern = AccessPattern::new(
            AccessPattern::new("createdAt").transform(TransformKind::Date),
        )
        .splay()
        .into();
        assert_eq!(pattern, expected);
    }

    #[test]
    fn test_equals_null_is_distinct_from_absent() {
        let Pattern::Access(with_null) =
            Pattern::from_json(&json!({"access": "a", "emit": true, "equals": null})).unwrap()
        else {
            panic!("expected access pattern");
        };
        assert_eq!(with_null.equals, Some(Value::Null));

        let Pattern::Access(without) =
            Pattern::from_json(&json!({"access": "a", "emit": true})).unwrap()
        else {
            panic!("expected access pattern");
        };
        assert_eq!(without.equals, None);
    }

    #[test]
    fn test_parse_errors_carry_location() {
        let err = ViewSpec::from_json(&json!({
            "key": ["user", {"access": "tags", "transform": "fortnight"}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTransform {
                location: "key[1].transform".into(),
                name: "fortnight".into()
            }
        );

        let err = ViewSpec::from_json(&json!({"key": {"access": {"splay": true}}})).unwrap_err();
        assert!(err.to_string().contains("key.access"), "{}", err);

        let err = ViewSpec::from_json(&json!({"key": {"access": "a", "splay": "yes"}})).unwrap_err();
        assert!(err.to_string().contains("key.splay"), "{}", err);

        let err = ViewSpec::from_json(&json!({"key": 42})).unwrap_err();
        assert!(err.to_string().contains("got a number"), "{}", err);
    }

    #[test]
    fn test_view_requires_key() {
        let err = ViewSpec::from_json(&json!({"value": "foo"})).unwrap_err();
        assert!(err.to_string().contains("'key'"));
    }

    #[test]
    fn test_view_rejects_unknown_fields() {
        let err = ViewSpec::from_json(&json!({"map": {"key": "foo"}})).unwrap_err();
        assert!(err.to_string().contains("'map'"));
    }

    #[test]
    fn test_view_round_trips_through_serde() {
        let raw = json!({
            "key": ["user", {"access": "tags", "splay": true}, {"access": "kind", "emit": true, "equals": "post"}],
            "value": {"access": "body", "transform": "words", "flatten": true},
            "reduce": "_count"
        });
        let spec: ViewSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&spec).unwrap(), raw);
    }

    #[test]
    fn test_null_value_and_reduce_are_absent() {
        let spec = ViewSpec::from_json(&json!({"key": "a", "value": null, "reduce": null})).unwrap();
        assert_eq!(spec, ViewSpec::new("a"));
    }
}

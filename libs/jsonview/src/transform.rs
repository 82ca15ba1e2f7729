//! Semantic value transforms and row-shaping annotations
//!
//! A descriptor is applied in two steps:
//!
//! 1. the optional named transform (calendar/clock decomposition or tokenization),
//! 2. at most one annotation, by precedence `emit` > `splay` > `flatten`.
//!
//! Transform failures never escape: they become [`InterpretedValue::Failed`].

use crate::compiler::CompileOptions;
use crate::pattern::{AccessPattern, TransformKind};
use crate::temporal_parse::parse_timestamp;
use crate::value::{is_truthy, InterpretedValue};
use chrono::{DateTime, Datelike, Timelike, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Calendar and clock components of a UTC instant, rendered as zero-padded strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub millisecond: String,
}

impl Timestamp {
    pub fn from_value(value: &Value) -> Option<Self> {
        parse_timestamp(value).map(|dt| Self::from_datetime(&dt))
    }

    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self {
            year: format_year(dt.year()),
            month: format!("{:02}", dt.month()),
            day: format!("{:02}", dt.day()),
            hour: format!("{:02}", dt.hour()),
            minute: format!("{:02}", dt.minute()),
            second: format!("{:02}", dt.second()),
            millisecond: format!("{:03}", dt.timestamp_subsec_millis().min(999)),
        }
    }

    /// `[Y, M, D]`
    pub fn date(&self) -> Value {
        strings([&self.year, &self.month, &self.day])
    }

    /// `[H, Min, S, Ms]`
    pub fn time(&self) -> Value {
        strings([&self.hour, &self.minute, &self.second, &self.millisecond])
    }

    /// `[Y, M, D, H, Min, S, Ms]`
    pub fn datetime(&self) -> Value {
        strings([
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
            &self.minute,
            &self.second,
            &self.millisecond,
        ])
    }

    fn component(&self, kind: TransformKind, options: &CompileOptions) -> Value {
        match kind {
            TransformKind::Date => self.date(),
            TransformKind::Year => Value::String(self.year.clone()),
            TransformKind::Month => Value::String(self.month.clone()),
            TransformKind::YearMonth => strings([&self.year, &self.month]),
            TransformKind::Day => Value::String(self.day.clone()),
            TransformKind::Time => self.time(),
            TransformKind::Hour => Value::String(self.hour.clone()),
            TransformKind::Minute if options.legacy_minute => Value::String(self.hour.clone()),
            TransformKind::Minute => Value::String(self.minute.clone()),
            TransformKind::DateTime => self.datetime(),
            TransformKind::Words => unreachable!("words is not a temporal transform"),
        }
    }
}

// ISO-8601 expanded years carry a sign and six digits.
fn format_year(year: i32) -> String {
    match year {
        0..=9999 => format!("{:04}", year),
        y if y < 0 => format!("-{:06}", -(y as i64)),
        y => format!("+{:06}", y),
    }
}

fn strings<const N: usize>(parts: [&String; N]) -> Value {
    Value::Array(parts.iter().map(|s| Value::String((*s).clone())).collect())
}

fn word_pattern() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"[A-Za-z0-9_'-]+").expect("word pattern is valid"))
}

/// Lower-cased word tokens of `text`, in order of appearance.
pub fn words(text: &str) -> Vec<String> {
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Apply a named transform to an un-annotated value.
pub fn apply_transform(
    kind: TransformKind,
    input: InterpretedValue,
    options: &CompileOptions,
) -> InterpretedValue {
    if input.is_absent() {
        return input;
    }
    let value = input.into_payload();

    if kind.is_temporal() {
        return match Timestamp::from_value(&value) {
            Some(ts) => InterpretedValue::Plain(ts.component(kind, options)),
            None => InterpretedValue::Failed,
        };
    }

    let Value::String(text) = &value else {
        return InterpretedValue::Failed;
    };
    let tokens = words(text);
    if tokens.is_empty() {
        return InterpretedValue::Failed;
    }
    InterpretedValue::Plain(Value::Array(
        tokens.into_iter().map(Value::String).collect(),
    ))
}

/// Apply a descriptor's transform and annotation to the result of its `access`.
pub fn transform(
    pattern: &AccessPattern,
    input: InterpretedValue,
    options: &CompileOptions,
) -> InterpretedValue {
    if pattern.is_passthrough() {
        return input;
    }

    let value = match pattern.transform {
        Some(kind) => apply_transform(kind, input, options),
        None => input.strip(),
    };

    if pattern.emit {
        let matched = match &pattern.equals {
            Some(expected) => matches!(&value, InterpretedValue::Plain(v) if v == expected),
            None => is_truthy(&value),
        };
        return InterpretedValue::Guard {
            passes: matched != pattern.invert,
            value: value.into_payload(),
        };
    }

    if pattern.splay {
        return match value {
            InterpretedValue::Plain(Value::Array(items)) => InterpretedValue::Fanout(items),
            other => {
                tracing::trace!(
                    value = ?other,
                    "splay applied to a non-array value; no rows will be produced"
                );
                InterpretedValue::Fanout(Vec::new())
            }
        };
    }

    if pattern.flatten {
        if let InterpretedValue::Plain(Value::Array(items)) = value {
            return if items.is_empty() {
                InterpretedValue::Plain(Value::Array(items))
            } else {
                InterpretedValue::Flattenable(items)
            };
        }
    }

    value
}

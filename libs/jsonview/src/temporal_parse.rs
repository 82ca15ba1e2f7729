use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;

/// Largest absolute epoch offset, in milliseconds, that a timestamp may carry.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Interpret a JSON value as a UTC instant.
///
/// Numbers are epoch milliseconds; strings are ISO-8601-ish dates or date-times.
/// Everything else is not a timestamp.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => from_epoch_millis(n.as_f64()?),
        Value::String(s) => parse_datetime_lenient(s),
        _ => None,
    }
}

fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    match s.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", s), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
        _ => None,
    }
}

pub(crate) fn parse_datetime_lenient(input: &str) -> Option<DateTime<Utc>> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Date-only values are midnight UTC.
    let Some((date_part, rest)) = raw.split_once('T') else {
        let date = parse_date(raw)?;
        let local = NaiveDateTime::new(date, NaiveTime::from_hms_opt(0, 0, 0)?);
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(local, Utc));
    };

    let date = parse_date(date_part)?;
    let (time_part, tz_offset) = parse_timezone(rest)?;
    let time = parse_time(time_part)?;

    let local = NaiveDateTime::new(date, time);
    match tz_offset {
        Some(offset_secs) => {
            let offset = FixedOffset::east_opt(offset_secs)?;
            Some(
                offset
                    .from_local_datetime(&local)
                    .single()?
                    .with_timezone(&Utc),
            )
        }
        None => Some(DateTime::<Utc>::from_naive_utc_and_offset(local, Utc)),
    }
}

fn parse_timezone(rest: &str) -> Option<(&str, Option<i32>)> {
    if let Some(stripped) = rest.strip_suffix('Z') {
        return Some((stripped, Some(0)));
    }

    if let Some(pos) = rest.rfind(['+', '-']) {
        let (time, tz) = rest.split_at(pos);
        let tz = tz.trim();
        if !tz.is_ascii() {
            return None;
        }
        let sign = if tz.starts_with('-') { -1 } else { 1 };
        if tz.len() == 6 && tz.as_bytes().get(3) == Some(&b':') {
            let hours: i32 = tz[1..3].parse().ok()?;
            let minutes: i32 = tz[4..6].parse().ok()?;
            return Some((time, Some(sign * (hours * 3600 + minutes * 60))));
        }
        if tz.len() == 5 {
            let hours: i32 = tz[1..3].parse().ok()?;
            let minutes: i32 = tz[3..5].parse().ok()?;
            return Some((time, Some(sign * (hours * 3600 + minutes * 60))));
        }
        return None;
    }

    Some((rest, None))
}

fn parse_time(time_part: &str) -> Option<NaiveTime> {
    let time_part = time_part.trim();
    if time_part.is_empty() {
        return None;
    }

    let (main, frac) = time_part
        .split_once('.')
        .map(|(a, b)| (a, Some(b)))
        .unwrap_or((time_part, None));

    let parts: Vec<&str> = main.split(':').collect();
    let (hour_str, minute_str, second_str) = match parts.as_slice() {
        [hh, mm] => (*hh, *mm, "0"),
        [hh, mm, ss] => (*hh, *mm, *ss),
        _ => return None,
    };

    let hour: u32 = hour_str.parse().ok()?;
    let minute: u32 = minute_str.parse().ok()?;
    let second: u32 = second_str.parse().ok()?;

    let nanos: u32 = match frac {
        Some(frac) if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) => {
            return None
        }
        Some(frac) => {
            let digits: String = frac.chars().take(3).collect();
            let padded = format!("{:0<3}", digits);
            let ms: u32 = padded.parse().ok()?;
            ms * 1_000_000
        }
        None => 0,
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

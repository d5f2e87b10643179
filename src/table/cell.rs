use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Number, Value};

/// Days value assigned to cells missing an age when filtering by age.
pub const MISSING_AGE_DAYS: f64 = 1e9;

/// Single value of a [`super::Table`].
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Missing-value marker: absent key, JSON `null` or failed coercion.
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// List or object value passed through untouched.
    Json(Value),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    /// Wraps a raw JSON value without any coercion.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Missing),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the cell.
    ///
    /// Only numeric variants are considered, text is never parsed here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Converts back to JSON, timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Missing => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
            Self::Json(v) => v.clone(),
            Self::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("-"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Self::Text(s) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Best-effort numeric coercion.
///
/// Mirrors a lenient "to numeric" conversion: numbers pass, numeric strings
/// are parsed after trimming, booleans map to 1/0. Everything else, including
/// NaN, yields [`Cell::Missing`].
pub(crate) fn coerce_numeric(value: &Value) -> Cell {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    match number {
        Some(f) if !f.is_nan() => Cell::Float(f),
        _ => Cell::Missing,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Flattens a list into a `", "`-joined display string.
///
/// Non-list values pass through untouched.
pub(crate) fn join_list(value: Value) -> Cell {
    match value {
        Value::Array(items) => Cell::Text(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Cell::from_json(other),
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an instant from a string or unix seconds.
///
/// Naive date-times are taken as UTC.
pub(crate) fn parse_timestamp(value: &Value) -> Cell {
    let ts = match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n.as_f64().and_then(from_unix_seconds),
        _ => None,
    };
    ts.map(Cell::Timestamp).unwrap_or(Cell::Missing)
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| Utc.from_utc_datetime(&d));
    }
    parse_number(s).and_then(from_unix_seconds)
}

fn from_unix_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let mut whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32)
}

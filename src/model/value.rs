//! Tagged attribute values
//!
//! Supported kinds:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - bool: Boolean
//! - timestamp: naive local date-time, microsecond precision
//! - json: any other JSON value (null, array, object), kept verbatim

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde_json::{Number, Value};

/// Text layout of persisted timestamps, fraction appended when non-zero.
const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// A single attribute value on a record
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Json(Value),
}

impl AttrValue {
    /// Coerces free console text into a value.
    ///
    /// Surrounding quotes are stripped. All-digit text becomes an integer,
    /// otherwise a finite float is attempted, otherwise the unquoted text is
    /// kept. `inf`, `nan` and overflowing exponents stay text, since the
    /// snapshot file has no way to hold them.
    pub fn coerce(text: &str) -> Self {
        let unquoted = strip_quotes(text);

        if !unquoted.is_empty() && unquoted.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = unquoted.parse::<i64>() {
                return AttrValue::Int(n);
            }
        }

        match unquoted.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => AttrValue::Float(f),
            _ => AttrValue::Str(unquoted.to_string()),
        }
    }

    /// Adopts a stored JSON value without reinterpreting strings.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => AttrValue::Str(s),
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Int(i),
                None => n
                    .as_f64()
                    .map(AttrValue::Float)
                    .unwrap_or(AttrValue::Json(Value::Number(n))),
            },
            other => AttrValue::Json(other),
        }
    }

    /// Renders the value for the persisted mapping.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Str(s) => Value::String(s.clone()),
            AttrValue::Int(i) => Value::from(*i),
            AttrValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::Timestamp(ts) => Value::String(format_timestamp(ts)),
            AttrValue::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for AttrValue {
    /// Literal-style rendering used inside display strings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(&quote_literal(s)),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => f.write_str(&float_literal(*x)),
            AttrValue::Bool(true) => f.write_str("True"),
            AttrValue::Bool(false) => f.write_str("False"),
            AttrValue::Timestamp(ts) => f.write_str(&timestamp_literal(ts)),
            AttrValue::Json(v) => f.write_str(&json_literal(v)),
        }
    }
}

/// Removes one pair of matching surrounding quotes, single or double.
pub fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Formats a timestamp as ISO-8601 text.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    let micros = ts.nanosecond() / 1_000;
    if micros == 0 {
        ts.format(ISO_SECONDS).to_string()
    } else {
        format!("{}.{:06}", ts.format(ISO_SECONDS), micros)
    }
}

/// Parses ISO-8601 text, with or without a fractional part.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>().ok()
}

fn quote_literal(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn float_literal(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        let sign = if x > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        // Debug keeps the trailing ".0" on whole numbers
        format!("{:?}", x)
    }
}

fn timestamp_literal(ts: &NaiveDateTime) -> String {
    use chrono::Datelike;

    let mut parts = vec![
        ts.year().to_string(),
        ts.month().to_string(),
        ts.day().to_string(),
        ts.hour().to_string(),
        ts.minute().to_string(),
    ];
    let micros = ts.nanosecond() / 1_000;
    if ts.second() != 0 || micros != 0 {
        parts.push(ts.second().to_string());
    }
    if micros != 0 {
        parts.push(micros.to_string());
    }
    format!("datetime.datetime({})", parts.join(", "))
}

fn json_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items
                .iter()
                .map(|v| AttrValue::from_json(v.clone()).to_string())
                .collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!("{}: {}", quote_literal(k), AttrValue::from_json(v.clone()))
                })
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        other => AttrValue::from_json(other.clone()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 9, 28)
            .unwrap()
            .and_hms_micro_opt(21, 5, 54, micro)
            .unwrap()
    }

    #[test]
    fn test_coerce_digits_to_int() {
        assert_eq!(AttrValue::coerce("5"), AttrValue::Int(5));
        assert_eq!(AttrValue::coerce("\"89\""), AttrValue::Int(89));
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(AttrValue::coerce("4.5"), AttrValue::Float(4.5));
        assert_eq!(AttrValue::coerce("-5"), AttrValue::Float(-5.0));
    }

    #[test]
    fn test_coerce_keeps_text_without_quotes() {
        assert_eq!(
            AttrValue::coerce("\"a@b.com\""),
            AttrValue::Str("a@b.com".to_string())
        );
        assert_eq!(AttrValue::coerce("'Betty'"), AttrValue::Str("Betty".to_string()));
        assert_eq!(AttrValue::coerce("\"\""), AttrValue::Str(String::new()));
    }

    #[test]
    fn test_coerce_non_finite_stays_text() {
        for text in ["inf", "-inf", "nan", "NaN", "infinity", "1e400"] {
            assert_eq!(AttrValue::coerce(text), AttrValue::Str(text.to_string()), "{}", text);
        }
        assert_eq!(AttrValue::coerce("inf").to_json(), Value::String("inf".to_string()));
    }

    #[test]
    fn test_coerce_huge_digit_run_falls_back_to_float() {
        let v = AttrValue::coerce("99999999999999999999999");
        assert!(matches!(v, AttrValue::Float(_)));
    }

    #[test]
    fn test_strip_quotes_only_matching_pairs() {
        assert_eq!(strip_quotes("\"x'"), "\"x'");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_timestamp_text_round_trip() {
        let with_fraction = ts(119427);
        assert_eq!(format_timestamp(&with_fraction), "2017-09-28T21:05:54.119427");
        assert_eq!(
            parse_timestamp("2017-09-28T21:05:54.119427"),
            Some(with_fraction)
        );

        let whole = ts(0);
        assert_eq!(format_timestamp(&whole), "2017-09-28T21:05:54");
        assert_eq!(parse_timestamp("2017-09-28T21:05:54"), Some(whole));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(AttrValue::Str("it's".into()).to_string(), "\"it's\"");
        assert_eq!(AttrValue::Str("Betty".into()).to_string(), "'Betty'");
        assert_eq!(AttrValue::Float(30.0).to_string(), "30.0");
        assert_eq!(AttrValue::Bool(true).to_string(), "True");
        assert_eq!(
            AttrValue::Timestamp(ts(119427)).to_string(),
            "datetime.datetime(2017, 9, 28, 21, 5, 54, 119427)"
        );
        assert_eq!(
            AttrValue::Json(serde_json::json!([1, "a", null])).to_string(),
            "[1, 'a', None]"
        );
    }

    #[test]
    fn test_from_json_keeps_strings_as_strings() {
        assert_eq!(
            AttrValue::from_json(Value::String("42".into())),
            AttrValue::Str("42".into())
        );
        assert_eq!(AttrValue::from_json(serde_json::json!(42)), AttrValue::Int(42));
        assert_eq!(AttrValue::from_json(serde_json::json!(1.5)), AttrValue::Float(1.5));
    }
}

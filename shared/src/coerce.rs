//! Tolerant readers for backend records.
//!
//! The admin API mixes `PascalCase`, `camelCase` and `snake_case` keys and
//! encodes flags as booleans, `0`/`1` or strings depending on the table the
//! value came from. Everything that reads a raw record goes through
//! [`RawRecord`], and every boolean goes through [`coerce_bool`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{entity::EntityId, error::AdaptError};

/// Collapse a boolean-like value into a `bool`.
///
/// `true` only for boolean `true`, numeric `1` and the strings `"1"` or
/// `"true"` (any case). Everything else, `null` and missing included, is
/// `false`.
pub fn coerce_bool(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64() == Some(1.0),
        Some(Value::String(text)) => {
            let text = text.trim();
            text == "1" || text.eq_ignore_ascii_case("true")
        },
        _ => false,
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrowed view over one JSON object with case-insensitive field lookup.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> RawRecord<'a> {
    /// Wrap a JSON value, rejecting anything but an object.
    pub fn new(value: &'a Value) -> Result<Self, AdaptError> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
            }),
            other => Err(AdaptError::NotAnObject(json_kind(other))),
        }
    }

    /// First non-null value whose key matches one of `aliases`, ignoring case,
    /// underscores and dashes.
    pub fn field(&self, aliases: &[&str]) -> Option<&'a Value> {
        if let Some(value) = aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .find(|value| !value.is_null())
        {
            return Some(value);
        }
        let wanted: Vec<String> = aliases.iter().map(|alias| normalize_key(alias)).collect();
        self.fields
            .iter()
            .filter(|(_, value)| !value.is_null())
            .find(|(key, _)| wanted.contains(&normalize_key(key)))
            .map(|(_, value)| value)
    }

    /// Required identifier. Numbers and non-empty strings are both accepted.
    pub fn id(&self, aliases: &[&str]) -> Result<EntityId, AdaptError> {
        self.text(aliases)
            .filter(|value| !value.is_empty())
            .map(EntityId::new)
            .ok_or(AdaptError::MissingId)
    }

    /// Text field; numbers and booleans are stringified.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.field(aliases)? {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Text field or the empty string.
    pub fn text_or_default(&self, aliases: &[&str]) -> String {
        self.text(aliases).unwrap_or_default()
    }

    /// Non-negative count. Numeric strings are parsed, anything else is 0.
    pub fn count(&self, aliases: &[&str]) -> u64 {
        match self.field(aliases) {
            Some(Value::Number(number)) => number
                .as_u64()
                .or_else(|| number.as_f64().filter(|value| *value > 0.0).map(|value| value as u64))
                .unwrap_or(0),
            Some(Value::String(text)) => text.trim().parse::<u64>().unwrap_or(0),
            Some(Value::Array(items)) => items.len() as u64,
            _ => 0,
        }
    }

    /// Boolean flag under [`coerce_bool`].
    pub fn flag(&self, aliases: &[&str]) -> bool {
        coerce_bool(self.field(aliases))
    }

    /// Boolean flag that defaults to `default` when the field is absent.
    ///
    /// A present field is still coerced, so `null` and `"yes"` are `false`.
    pub fn flag_or(&self, aliases: &[&str], default: bool) -> bool {
        let present = aliases
            .iter()
            .map(|alias| normalize_key(alias))
            .any(|wanted| self.fields.keys().any(|key| normalize_key(key) == wanted));
        if present {
            self.flag(aliases)
        } else {
            default
        }
    }

    /// Timestamp from RFC 3339, a naive `YYYY-MM-DD[ HH:MM:SS]` string, or
    /// epoch seconds/milliseconds.
    pub fn timestamp(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        match self.field(aliases)? {
            Value::String(text) => parse_timestamp(text),
            Value::Number(number) => number.as_i64().and_then(from_epoch),
            _ => None,
        }
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    // Anything past year 5138 in seconds is treated as milliseconds.
    if value.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|value| value.and_utc());
    }
    text.parse::<i64>().ok().and_then(from_epoch)
}

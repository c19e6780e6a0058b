//! Typed key/value attributes attached to records
//!
//! An [`Attribute`] is a key plus a [`Value`]. Values are a closed set of
//! types, including nested groups of further attributes. Construction does
//! no validation: empty keys and duplicate keys pass through unchanged.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::time::Duration;

/// Value type for structured attributes
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Duration(Duration),
    Group(Vec<Attribute>),
}

impl Value {
    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Groups become nested objects; a later duplicate key overwrites an
    /// earlier one, so the last write is the visible one.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Time(t) => serde_json::Value::String(format_time(t)),
            Value::Duration(d) => serde_json::Value::String(format!("{:?}", d)),
            Value::Group(attrs) => {
                let mut map = serde_json::Map::new();
                for attr in attrs {
                    map.insert(attr.key.clone(), attr.value.to_json_value());
                }
                serde_json::Value::Object(map)
            }
        }
    }

    /// Name of the variant, as used in printf diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::Group(_) => "group",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Time(t) => write!(f, "{}", format_time(t)),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Group(attrs) => {
                write!(f, "{{")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

/// Values above `i64::MAX` are kept exact as their decimal string
impl From<u64> for Value {
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or_else(|_| Value::String(i.to_string()), Value::Int)
    }
}

/// Values above `i64::MAX` are kept exact as their decimal string
impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or_else(|_| Value::String(i.to_string()), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Attribute>> for Value {
    fn from(attrs: Vec<Attribute>) -> Self {
        Value::Group(attrs)
    }
}

/// A single typed key/value field
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn float(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn time(key: impl Into<String>, value: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, Value::Duration(value))
    }

    pub fn group(key: impl Into<String>, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        Self::new(key, Value::Group(attrs.into_iter().collect()))
    }

    /// Flatten nested groups into `(dotted.key, value)` pairs
    ///
    /// Empty path segments are skipped, so a group with an empty key
    /// inlines its members.
    pub fn flatten<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
        let key = match (prefix.is_empty(), self.key.is_empty()) {
            (true, _) => self.key.clone(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{}.{}", prefix, self.key),
        };
        match &self.value {
            Value::Group(attrs) => {
                for attr in attrs {
                    attr.flatten(&key, out);
                }
            }
            value => out.push((key, value)),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

//! Rendering records into lines
//!
//! - Text: human-readable, `[ts] [LEVEL] thread - [PREFIX] message k=v ...`
//! - Json: one object per line, groups nested
//! - Logfmt: `key=value` pairs, groups flattened with dotted keys
//!
//! Context pairs are rendered before call-site attributes.

use super::attribute::{Attribute, Value};
use super::record::{escape_control, needs_escape, Record};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Output format for records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] main - Request processed status=200`
    #[default]
    Text,

    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","message":"Request processed"}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO message="Request processed"`
    Logfmt,
}

/// Format + timestamp style + optional fields, shared by the writer sinks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFormatter {
    pub format: OutputFormat,
    pub timestamp: TimestampFormat,
    /// Append `file:line` (text) or `file`/`line` fields when known
    pub include_location: bool,
}

impl RecordFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: TimestampFormat) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    /// Render one record, without a trailing newline
    pub fn format(&self, record: &Record) -> String {
        match self.format {
            OutputFormat::Text => self.format_text(record),
            OutputFormat::Json => self.format_json(record),
            OutputFormat::Logfmt => self.format_logfmt(record),
        }
    }

    fn format_text(&self, record: &Record) -> String {
        let thread = record.thread_name.as_ref().unwrap_or(&record.thread_id);
        let mut line = format!(
            "[{}] [{:5}] {} - {}",
            escape_control(&self.timestamp.format(&record.timestamp)),
            record.level.to_str(),
            escape_control(thread),
            record.rendered_message()
        );

        for attr in record.all_attributes() {
            line.push(' ');
            line.push_str(&text_attribute(attr));
        }

        if self.include_location {
            if let Some(location) = record.location {
                line.push_str(&format!(" ({}:{})", location.file, location.line));
            }
        }

        line
    }

    fn format_json(&self, record: &Record) -> String {
        let mut object = serde_json::Map::new();

        object.insert(
            "timestamp".to_string(),
            self.timestamp.to_json_value(&record.timestamp),
        );
        object.insert("level".to_string(), record.level.to_str().into());
        object.insert("message".to_string(), record.rendered_message().into());
        object.insert("thread_id".to_string(), record.thread_id.clone().into());
        if let Some(ref name) = record.thread_name {
            object.insert("thread_name".to_string(), name.clone().into());
        }

        if self.include_location {
            if let Some(location) = record.location {
                object.insert("file".to_string(), location.file.into());
                object.insert("line".to_string(), location.line.into());
                object.insert("module_path".to_string(), location.module_path.into());
            }
        }

        // Later keys overwrite earlier ones: call-site attributes win
        for attr in record.all_attributes() {
            object.insert(attr.key.clone(), attr.value.to_json_value());
        }

        serde_json::Value::Object(object).to_string()
    }

    fn format_logfmt(&self, record: &Record) -> String {
        let mut parts = Vec::new();

        parts.push(format!(
            "timestamp={}",
            escape_logfmt_value(&self.timestamp.format(&record.timestamp))
        ));
        parts.push(format!("level={}", record.level.to_str()));
        // Message is always quoted
        parts.push(format!("message={}", quote_logfmt_value(&record.rendered_message())));
        parts.push(format!("thread_id={}", escape_logfmt_value(&record.thread_id)));
        if let Some(ref name) = record.thread_name {
            parts.push(format!("thread_name={}", escape_logfmt_value(name)));
        }

        if self.include_location {
            if let Some(location) = record.location {
                parts.push(format!("file={}", escape_logfmt_value(location.file)));
                parts.push(format!("line={}", location.line));
            }
        }

        let mut flat = Vec::new();
        for attr in record.all_attributes() {
            attr.flatten("", &mut flat);
        }
        for (key, value) in flat {
            parts.push(format!("{}={}", escape_logfmt_key(&key), logfmt_value(value)));
        }

        parts.join(" ")
    }
}

fn text_attribute(attr: &Attribute) -> String {
    format!("{}={}", escape_control(&attr.key), text_value(&attr.value))
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quoting(s) => quote_logfmt_value(s),
        Value::Group(attrs) => {
            let inner: Vec<String> = attrs.iter().map(text_attribute).collect();
            format!("{{{}}}", inner.join(" "))
        }
        other => other.to_string(),
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || needs_escape(c))
}

fn logfmt_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote_logfmt_value(s),
        other => escape_logfmt_value(&other.to_string()),
    }
}

/// Keep only characters that are safe in a logfmt key
fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Quote a logfmt value if it contains whitespace, quotes, `=` or control
/// characters
fn escape_logfmt_value(value: &str) -> String {
    if needs_quoting(value) {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

/// Quoted value with backslashes, quotes and control characters escaped
fn quote_logfmt_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escape_control(&escaped))
}

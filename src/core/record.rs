//! Record: the snapshot of one log event

use super::attribute::Attribute;
use super::context::Context;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::sync::Arc;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Characters that could start a new line or hide text in the output
pub(crate) fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}')
}

/// Escape line breaks, tabs and other control characters
///
/// `\n`, `\r` and `\t` become their two-character escapes, anything else
/// becomes `\u{..}`. Backslashes are left alone, so escaping twice is a no-op.
pub(crate) fn escape_control(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if needs_escape(c) => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Source location captured by the logging macros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
}

/// One log event
///
/// Built once per enabled log call and handed to handlers by shared
/// reference only, so no handler can alter what its siblings see.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Attributes passed at the call site, after any logger-scoped ones
    pub attributes: Vec<Attribute>,
    /// Pairs collected from the caller's context chain
    pub context: Vec<Attribute>,
    pub prefix: Option<Arc<String>>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub location: Option<Location>,
    origin: Context,
}

impl Record {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, tabs and other control
    /// characters with escape sequences to prevent attackers from injecting
    /// fake log entries.
    fn sanitize_message(message: String) -> String {
        if !message.chars().any(needs_escape) {
            return message;
        }
        escape_control(&message).into_owned()
    }

    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: Self::sanitize_message(message.into()),
            attributes: Vec::new(),
            context: Vec::new(),
            prefix: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            location: None,
            origin: Context::background(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Snapshot the context chain and remember the context itself
    #[must_use]
    pub fn with_context(mut self, ctx: &Context) -> Self {
        self.context = ctx.snapshot();
        self.origin = ctx.clone();
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<Arc<String>>) -> Self {
        self.prefix = prefix;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The context the record was emitted under
    pub fn origin(&self) -> &Context {
        &self.origin
    }

    /// Message as handlers should render it: `[PREFIX] message`
    pub fn rendered_message(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("[{}] {}", escape_control(prefix), self.message),
            None => self.message.clone(),
        }
    }

    /// Context pairs followed by record attributes
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.context.iter().chain(self.attributes.iter())
    }

    /// Look up a top-level attribute; call-site attributes shadow context ones
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .rev()
            .find(|a| a.key == key)
            .or_else(|| self.context.iter().rev().find(|a| a.key == key))
    }
}

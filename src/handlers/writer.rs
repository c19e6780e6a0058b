//! Line-oriented sink over any `std::io::Write`

use crate::core::{
    Context, Handler, LogLevel, LoggerError, OutputFormat, Record, RecordFormatter, Result,
    TimestampFormat,
};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one formatted line per record to `W`
///
/// The writer is behind its own lock, so concurrent dispatchers serialize
/// on this sink only.
///
/// # Example
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let handler = WriterHandler::new(Vec::new()).with_output_format(OutputFormat::Json);
/// handler
///     .handle(&Context::background(), &Record::new(LogLevel::Info, "hello"))
///     .unwrap();
///
/// let bytes = handler.into_inner();
/// assert!(String::from_utf8(bytes).unwrap().contains("\"message\":\"hello\""));
/// ```
pub struct WriterHandler<W: Write + Send> {
    writer: Mutex<W>,
    formatter: RecordFormatter,
    min_level: LogLevel,
    name: String,
}

impl<W: Write + Send> WriterHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter: RecordFormatter::default(),
            min_level: LogLevel::Trace,
            name: "writer".to_string(),
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the output format for this handler
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.formatter.format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.formatter.timestamp = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.formatter.timestamp = TimestampFormat::Custom(format_str.to_string());
        self
    }

    #[must_use]
    pub fn with_location(mut self, include: bool) -> Self {
        self.formatter.include_location = include;
        self
    }

    /// Name reported in errors
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn formatter(&self) -> &RecordFormatter {
        &self.formatter
    }

    /// Recover the writer; `BufWriter` sinks flush when dropped
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterHandler<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_structured_logger::prelude::*;
    ///
    /// let handler = WriterHandler::file("/var/log/app.log")
    ///     .unwrap()
    ///     .with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))?;
        Ok(Self::new(BufWriter::new(file)).with_name("file"))
    }
}

impl<W: Write + Send> Handler for WriterHandler<W> {
    fn enabled(&self, _ctx: &Context, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<()> {
        let mut line = self.formatter.format(record);
        line.push('\n');
        self.writer.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Console handler: stdout for routine levels, stderr from `ERROR` up

use crate::core::{
    Context, Handler, LogLevel, OutputFormat, Record, RecordFormatter, Result, TimestampFormat,
};
use std::io::Write;

pub struct ConsoleHandler {
    use_colors: bool,
    formatter: RecordFormatter,
    min_level: LogLevel,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            formatter: RecordFormatter::default(),
            min_level: LogLevel::Trace,
        }
    }

    /// Colors need the `console` feature; without it this is a no-op
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors && cfg!(feature = "console");
        self
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the output format for this handler
    ///
    /// # Example
    ///
    /// ```
    /// use rust_structured_logger::{ConsoleHandler, OutputFormat};
    ///
    /// let handler = ConsoleHandler::new().with_output_format(OutputFormat::Json);
    /// ```
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

    fn render(&self, record: &Record) -> String {
        match self.formatter.format {
            OutputFormat::Text if self.use_colors => self.format_colored(record),
            _ => self.formatter.format(record),
        }
    }

    #[cfg(feature = "console")]
    fn format_colored(&self, record: &Record) -> String {
        use colored::Colorize;

        let plain = self.formatter.format(record);
        let level = format!("{:5}", record.level.to_str());
        // Only the level tag is colored; the rest of the line is unchanged
        plain.replacen(
            &format!("[{}]", level),
            &format!("[{}]", level.color(record.level.color_code())),
            1,
        )
    }

    #[cfg(not(feature = "console"))]
    fn format_colored(&self, record: &Record) -> String {
        self.formatter.format(record)
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ConsoleHandler {
    fn enabled(&self, _ctx: &Context, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<()> {
        let output = self.render(record);

        // Route Error and above to stderr, others to stdout
        if record.level >= LogLevel::Error {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

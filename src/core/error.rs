//! Error types for the logging core

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid wiring or configuration detected while building a logger
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// A named handler failed to deliver a record
    #[error("Handler '{handler}' failed: {source}")]
    Handler {
        handler: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// A named handler panicked while delivering a record
    #[error("Handler '{handler}' panicked: {message}")]
    HandlerPanic { handler: String, message: String },

    /// Several handlers of a fanout failed for the same record
    #[error("{} handlers failed: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<LoggerError>),

    /// Record submitted after the delivery channel was closed
    #[error("Delivery channel is closed")]
    ChannelClosed,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Tag an error with the name of the handler that produced it
    pub fn handler(handler: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::Handler {
            handler: handler.into(),
            source: Box::new(source),
        }
    }

    pub fn handler_panic(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HandlerPanic {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Collapse a list of failures: none is `Ok`, one is returned as is,
    /// several become [`LoggerError::Multiple`].
    pub fn aggregate(mut errors: Vec<LoggerError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoggerError::Multiple(errors)),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for configuration errors, which are fatal to setup
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::InvalidConfiguration { .. })
    }
}

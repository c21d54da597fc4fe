//! Component-tagged structured logging.
//!
//! Every record carries a level, the originating component name, a message
//! and an optional JSON context object. Records are emitted as `tracing`
//! events, so the sink (console, JSON file, test capture) is whatever
//! subscriber the process installed.
//!
//! ```
//! use lexicon_core::Logger;
//! use serde_json::json;
//!
//! let log = Logger::new("PageController");
//! log.info("initialized");
//! log.warn_with("element missing", &json!({ "element_id": "signout-btn" }));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected but recoverable
    Warn,
    /// An operation failed
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

// `tracing` callsites need a constant level, hence one expansion per arm.
macro_rules! emit {
    ($level:expr, $component:expr, $message:expr, $context:expr) => {
        match $context {
            Some(context) => tracing::event!(
                $level,
                component = $component,
                context = %context,
                "{}",
                $message
            ),
            None => tracing::event!($level, component = $component, "{}", $message),
        }
    };
}

/// Logger bound to a fixed component name
///
/// Constructed once per component instance; cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    component: &'static str,
}

impl Logger {
    /// Create a logger tagged with `component`
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// The component tag attached to every record
    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }

    /// Emit a record at `level` with optional structured context
    pub fn log(&self, level: LogLevel, message: &str, context: Option<&Value>) {
        let component = self.component;
        match level {
            LogLevel::Debug => emit!(tracing::Level::DEBUG, component, message, context),
            LogLevel::Info => emit!(tracing::Level::INFO, component, message, context),
            LogLevel::Warn => emit!(tracing::Level::WARN, component, message, context),
            LogLevel::Error => emit!(tracing::Level::ERROR, component, message, context),
        }
    }

    /// Debug record
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, None);
    }

    /// Info record
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, None);
    }

    /// Warning record
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, None);
    }

    /// Error record
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, None);
    }

    /// Debug record with context
    pub fn debug_with(&self, message: &str, context: &Value) {
        self.log(LogLevel::Debug, message, Some(context));
    }

    /// Info record with context
    pub fn info_with(&self, message: &str, context: &Value) {
        self.log(LogLevel::Info, message, Some(context));
    }

    /// Warning record with context
    pub fn warn_with(&self, message: &str, context: &Value) {
        self.log(LogLevel::Warn, message, Some(context));
    }

    /// Error record with context
    pub fn error_with(&self, message: &str, context: &Value) {
        self.log(LogLevel::Error, message, Some(context));
    }
}

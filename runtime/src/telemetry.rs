//! Process-wide tracing setup.
//!
//! Binaries call [`init_tracing`] once at startup. The filter comes from
//! `RUST_LOG` when set, otherwise from [`TelemetryConfig::default_filter`].

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse `"json"` / `"pretty"` (case-insensitive); anything else is `None`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Directive used when `RUST_LOG` is unset or invalid
    pub default_filter: String,
    /// Output format
    pub format: LogFormat,
}

impl TelemetryConfig {
    /// Create a config with the given fallback filter
    #[must_use]
    pub fn new(default_filter: impl Into<String>) -> Self {
        Self {
            default_filter: default_filter.into(),
            format: LogFormat::Pretty,
        }
    }

    /// Set the output format
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Read `LEXICON_LOG_FORMAT` on top of the defaults
    #[must_use]
    pub fn from_env() -> Self {
        let format = std::env::var("LEXICON_LOG_FORMAT")
            .ok()
            .and_then(|value| LogFormat::parse(&value))
            .unwrap_or_default();

        Self::default().with_format(format)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new("info,lexicon_identity=debug,lexicon_page=debug")
    }
}

/// Install the global subscriber
///
/// Returns `false` if a global subscriber was already installed, which
/// makes repeated calls (tests, embedded use) harmless.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    result.is_ok()
}

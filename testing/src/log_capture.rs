//! A `tracing` layer that records events in memory.
//!
//! Install it as the thread-local default for the duration of a test. With
//! tokio's default current-thread test runtime this also covers spawned
//! tasks.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    /// Event level
    pub level: Level,
    /// `component` field, if the event carried one
    pub component: Option<String>,
    /// Formatted message
    pub message: String,
    /// `context` field, if present
    pub context: Option<String>,
}

/// Shared in-memory sink for tracing events
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl LogCapture {
    /// Create an empty capture
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread-local default subscriber until the guard drops
    #[must_use = "capture stops when the guard is dropped"]
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    /// Snapshot of everything captured so far
    #[must_use]
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().clone()
    }

    /// Records emitted by `component`
    #[must_use]
    pub fn for_component(&self, component: &str) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.component.as_deref() == Some(component))
            .cloned()
            .collect()
    }

    /// Whether a record at `level` from `component` contains `fragment`
    #[must_use]
    pub fn contains(&self, level: Level, component: &str, fragment: &str) -> bool {
        self.count(level, component, fragment) > 0
    }

    /// Number of records at `level` from `component` containing `fragment`
    #[must_use]
    pub fn count(&self, level: Level, component: &str, fragment: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| {
                record.level == level
                    && record.component.as_deref() == Some(component)
                    && record.message.contains(fragment)
            })
            .count()
    }

    /// Drop everything captured so far
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        self.records.lock().push(CapturedRecord {
            level: *event.metadata().level(),
            component: visitor.component,
            message: visitor.message,
            context: visitor.context,
        });
    }
}

#[derive(Default)]
struct RecordVisitor {
    component: Option<String>,
    message: String,
    context: Option<String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "component" => self.component = Some(value.to_owned()),
            "message" => self.message = value.to_owned(),
            "context" => self.context = Some(value.to_owned()),
            _ => {},
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "component" => self.component = Some(format!("{value:?}")),
            "message" => self.message = format!("{value:?}"),
            "context" => self.context = Some(format!("{value:?}")),
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_core::Logger;

    #[test]
    fn test_captures_component_records() {
        let logs = LogCapture::new();
        let _guard = logs.install();

        let log = Logger::new("PageController");
        log.info("rendered");
        log.warn_with("element missing", &serde_json::json!({ "id": "signout-btn" }));
        tracing::info!("untagged");

        assert_eq!(logs.records().len(), 3);
        assert!(logs.contains(Level::INFO, "PageController", "rendered"));
        assert_eq!(logs.count(Level::WARN, "PageController", "missing"), 1);

        let tagged = logs.for_component("PageController");
        assert_eq!(tagged.len(), 2);
        assert_eq!(
            tagged[1].context.as_deref(),
            Some(r#"{"id":"signout-btn"}"#)
        );
    }

    #[test]
    fn test_clear() {
        let logs = LogCapture::new();
        let _guard = logs.install();

        Logger::new("X").error("boom");
        logs.clear();
        assert!(logs.records().is_empty());
    }
}

//! Named dashboard capability slots.
//!
//! The dashboard's quick actions and search have no real behaviour yet.
//! Each is a slot on [`DashboardCapabilities`] so hosts can plug features
//! in one at a time and tests can assert which slot ran.

use crate::view::Intent;
use lexicon_core::Logger;
use serde_json::json;

/// Dashboard actions reachable from the authenticated view.
pub trait DashboardCapabilities: Send + Sync {
    /// "Add word" quick action.
    fn add_word(&self);

    /// "View vocabulary" quick action.
    fn view_vocabulary(&self);

    /// "Practice" quick action.
    fn practice(&self);

    /// Vocabulary search for `query`.
    fn search(&self, query: &str);
}

/// Route `intent` to its slot.
pub fn invoke(capabilities: &dyn DashboardCapabilities, intent: &Intent) {
    match intent {
        Intent::AddWord => capabilities.add_word(),
        Intent::ViewVocabulary => capabilities.view_vocabulary(),
        Intent::Practice => capabilities.practice(),
        Intent::Search(query) => capabilities.search(query),
    }
}

/// Placeholder implementation: logs the interaction and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct ComingSoon {
    log: Logger,
}

impl ComingSoon {
    /// Create the placeholder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log: Logger::new("Dashboard"),
        }
    }

    fn record(&self, action: &str) {
        self.log
            .info_with("Dashboard action invoked", &json!({ "action": action }));
    }
}

impl Default for ComingSoon {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardCapabilities for ComingSoon {
    fn add_word(&self) {
        self.record("add_word");
    }

    fn view_vocabulary(&self) {
        self.record("view_vocabulary");
    }

    fn practice(&self) {
        self.record("practice");
    }

    fn search(&self, query: &str) {
        self.log.info_with(
            "Dashboard action invoked",
            &json!({ "action": "search", "query": query }),
        );
    }
}

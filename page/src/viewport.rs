//! Render target abstraction.
//!
//! The controller only needs to replace named regions wholesale, ask
//! whether an element exists, and attach handlers. [`MemoryViewPort`] is the
//! in-process implementation used by tests and the walkthrough demo.

use crate::view::Fragment;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Addressable page region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Header with sign-in links or the user profile
    AuthSection,
    /// Welcome hero or dashboard
    MainContent,
    /// Transient notifications
    Notices,
}

/// User interaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEvent {
    /// Pointer activation
    Click,
    /// Enter pressed in a text input; the payload is the input text
    Submit,
}

/// Event handler; receives the event payload (search text) if any.
pub type Handler = Arc<dyn Fn(Option<String>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure as a [`Handler`].
pub fn handler<F, Fut>(callback: F) -> Handler
where
    F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |payload| Box::pin(callback(payload)))
}

/// Host document seen by the controller.
pub trait ViewPort: Send + Sync {
    /// Replace `region` with `fragment`.
    ///
    /// Handlers bound to elements of the previous content are discarded.
    fn replace(&self, region: Region, fragment: Fragment);

    /// Whether an element with `element_id` is currently mounted.
    fn contains(&self, element_id: &str) -> bool;

    /// Attach `handler` for `event` on `element_id`, replacing any handler
    /// already bound for that pair. Returns `false` if the element does not
    /// exist.
    fn bind(&self, element_id: &str, event: UiEvent, handler: Handler) -> bool;
}

#[derive(Default)]
struct Document {
    regions: HashMap<Region, Fragment>,
    handlers: HashMap<(String, UiEvent), Handler>,
    replacements: HashMap<Region, usize>,
}

impl Document {
    fn contains(&self, element_id: &str) -> bool {
        self.regions
            .values()
            .any(|fragment| fragment.contains(element_id))
    }
}

/// In-memory [`ViewPort`].
#[derive(Default)]
pub struct MemoryViewPort {
    document: Mutex<Document>,
}

impl MemoryViewPort {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `region` (empty if never rendered).
    #[must_use]
    pub fn fragment(&self, region: Region) -> Fragment {
        self.document
            .lock()
            .regions
            .get(&region)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `region` was replaced.
    #[must_use]
    pub fn replacements(&self, region: Region) -> usize {
        self.document
            .lock()
            .replacements
            .get(&region)
            .copied()
            .unwrap_or(0)
    }

    /// Number of bound handlers across the document.
    #[must_use]
    pub fn bound_handlers(&self) -> usize {
        self.document.lock().handlers.len()
    }

    /// Whether a handler is bound for `event` on `element_id`.
    #[must_use]
    pub fn is_bound(&self, element_id: &str, event: UiEvent) -> bool {
        self.document
            .lock()
            .handlers
            .contains_key(&(element_id.to_string(), event))
    }

    /// Simulate a click; returns `false` if nothing was bound.
    pub async fn click(&self, element_id: &str) -> bool {
        self.fire(element_id, UiEvent::Click, None).await
    }

    /// Simulate Enter in an input holding `text`.
    pub async fn submit(&self, element_id: &str, text: &str) -> bool {
        self.fire(element_id, UiEvent::Submit, Some(text.to_string()))
            .await
    }

    async fn fire(&self, element_id: &str, event: UiEvent, payload: Option<String>) -> bool {
        let handler = self
            .document
            .lock()
            .handlers
            .get(&(element_id.to_string(), event))
            .cloned();

        match handler {
            Some(handler) => {
                handler(payload).await;
                true
            },
            None => false,
        }
    }
}

impl ViewPort for MemoryViewPort {
    fn replace(&self, region: Region, fragment: Fragment) {
        let mut document = self.document.lock();

        if let Some(previous) = document.regions.remove(&region) {
            let stale: Vec<String> = previous.ids().into_iter().map(str::to_string).collect();
            document
                .handlers
                .retain(|(element_id, _), _| !stale.contains(element_id));
        }

        document.regions.insert(region, fragment);
        *document.replacements.entry(region).or_insert(0) += 1;
    }

    fn contains(&self, element_id: &str) -> bool {
        self.document.lock().contains(element_id)
    }

    fn bind(&self, element_id: &str, event: UiEvent, handler: Handler) -> bool {
        let mut document = self.document.lock();
        if !document.contains(element_id) {
            return false;
        }
        document
            .handlers
            .insert((element_id.to_string(), event), handler);
        true
    }
}

impl std::fmt::Debug for MemoryViewPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let document = self.document.lock();
        f.debug_struct("MemoryViewPort")
            .field("regions", &document.regions)
            .field("handlers", &document.handlers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::view::{Element, ElementKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn button(id: &str) -> Fragment {
        Fragment::single(Element::new(ElementKind::Button).with_id(id))
    }

    fn counting(count: &Arc<AtomicUsize>) -> Handler {
        let count = Arc::clone(count);
        handler(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            async {}
        })
    }

    #[tokio::test]
    async fn test_bind_requires_mounted_element() {
        let viewport = MemoryViewPort::new();
        let count = Arc::new(AtomicUsize::new(0));

        assert!(!viewport.bind("go", UiEvent::Click, counting(&count)));

        viewport.replace(Region::MainContent, button("go"));
        assert!(viewport.bind("go", UiEvent::Click, counting(&count)));
        assert!(viewport.click("go").await);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rebinding_replaces_handler() {
        let viewport = MemoryViewPort::new();
        let count = Arc::new(AtomicUsize::new(0));
        viewport.replace(Region::AuthSection, button("signout-btn"));

        viewport.bind("signout-btn", UiEvent::Click, counting(&count));
        viewport.bind("signout-btn", UiEvent::Click, counting(&count));
        viewport.click("signout-btn").await;

        assert_eq!(viewport.bound_handlers(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replace_discards_stale_handlers() {
        let viewport = MemoryViewPort::new();
        let count = Arc::new(AtomicUsize::new(0));
        viewport.replace(Region::MainContent, button("go"));
        viewport.bind("go", UiEvent::Click, counting(&count));

        viewport.replace(Region::MainContent, button("other"));

        assert!(!viewport.contains("go"));
        assert!(!viewport.click("go").await);
        assert_eq!(viewport.bound_handlers(), 0);
        assert_eq!(viewport.replacements(Region::MainContent), 2);
    }

    #[tokio::test]
    async fn test_submit_passes_text() {
        let viewport = MemoryViewPort::new();
        let seen = Arc::new(Mutex::new(None));
        viewport.replace(Region::MainContent, button("search-input"));

        let sink = Arc::clone(&seen);
        viewport.bind(
            "search-input",
            UiEvent::Submit,
            handler(move |payload| {
                *sink.lock() = payload;
                async {}
            }),
        );

        assert!(viewport.submit("search-input", "serendipity").await);
        assert_eq!(seen.lock().as_deref(), Some("serendipity"));
        assert!(!viewport.click("search-input").await);
    }
}

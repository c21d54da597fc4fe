//! Page lifecycle: subscribe, render, wire, tear down.
//!
//! ```text
//! IdentityProvider ──notify──► PageController ──send──► Store<PageReducer>
//!                                   │                        │
//!                                   └──mount/bind──► ViewPort ◄──notices──┘
//! ```
//!
//! Every notification is handled synchronously inside the provider's
//! callback: the state is reduced, both regions are replaced, intent
//! handlers are bound, and the sign-out control is wired.

use crate::error::{PageError, Result};
use crate::reducer::{Notice, NoticeLevel, PageAction, PageEnvironment, PageReducer, PageState};
use crate::render::render_notices;
use crate::sign_out::SignOutAction;
use crate::view::Intent;
use crate::viewport::{Region, UiEvent, ViewPort, handler};
use lexicon_core::Logger;
use lexicon_identity::{AuthState, IdentityProvider, Subscription, User, listener};
use lexicon_runtime::{EffectHandle, Store};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Store driving the page.
pub type PageStore = Store<PageState, PageAction, PageEnvironment, PageReducer>;

/// Owns the page for as long as it exists.
///
/// Dropping the controller calls [`cleanup`](Self::cleanup).
pub struct PageController<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    inner: Arc<Inner<P, V>>,
}

struct Inner<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    provider: Arc<P>,
    viewport: Arc<V>,
    store: PageStore,
    sign_out: SignOutAction<P>,
    initialized: AtomicBool,
    subscription: Mutex<Option<Subscription>>,
    notice_sync: Mutex<Option<JoinHandle<()>>>,
    render_failure: Mutex<Option<PageError>>,
    log: Logger,
}

impl<P, V> PageController<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    /// Create a controller; nothing happens until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(provider: Arc<P>, viewport: Arc<V>, environment: PageEnvironment) -> Self {
        let sign_out = SignOutAction::new(Arc::clone(&provider));

        Self {
            inner: Arc::new(Inner {
                provider,
                viewport,
                store: Store::new(PageState::default(), PageReducer, environment),
                sign_out,
                initialized: AtomicBool::new(false),
                subscription: Mutex::new(None),
                notice_sync: Mutex::new(None),
                render_failure: Mutex::new(None),
                log: Logger::new("PageController"),
            }),
        }
    }

    /// Subscribe to the provider and wait for the first paint.
    ///
    /// Registers exactly one subscription; once it has succeeded, later
    /// calls return `Ok(())` without doing anything. A failed attempt
    /// releases its subscription, so calling it again retries.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InitTimeout`] if no auth state arrives within
    /// the configured timeout, or the error that prevented the first
    /// render. Either way an error notice is shown.
    #[tracing::instrument(skip(self), name = "page_initialize")]
    pub async fn initialize(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.initialized.swap(true, Ordering::SeqCst) {
            inner.log.debug("Already initialized");
            return Ok(());
        }

        inner.log.info("Initializing page");
        inner.start_notice_sync();

        let weak: Weak<Inner<P, V>> = Arc::downgrade(inner);
        let subscription = inner.provider.subscribe(listener(move |state| {
            if let Some(inner) = weak.upgrade() {
                inner.on_auth_state(state);
            }
        }));
        *inner.subscription.lock() = Some(subscription);

        let timeout = inner.store.environment().config.init_timeout;
        let outcome = match tokio::time::timeout(timeout, inner.provider.wait_for_auth_state()).await {
            Ok(state) => inner.render_failure.lock().take().map_or(Ok(state), Err),
            Err(_) => Err(PageError::InitTimeout(timeout)),
        };

        match outcome {
            Ok(state) => {
                inner.log.info_with(
                    "Page initialized",
                    &json!({ "signed_in": state.is_signed_in() }),
                );
                Ok(())
            },
            Err(error) => {
                inner.log.error_with(
                    "Page initialization failed",
                    &json!({ "error": error.to_string() }),
                );
                inner.show_notice(NoticeLevel::Error, error.user_message());

                // Leave the controller ready for another attempt.
                if let Some(subscription) = inner.subscription.lock().take() {
                    subscription.unsubscribe();
                }
                inner.initialized.store(false, Ordering::SeqCst);
                Err(error)
            },
        }
    }

    /// Run the Google sign-in flow, surfacing failures as a notice.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Auth`] with the provider's error.
    pub async fn sign_in_with_google(&self) -> Result<User> {
        match self.inner.provider.sign_in_with_google().await {
            Ok(user) => Ok(user),
            Err(error) => {
                self.inner.log.error_with(
                    "Sign-in failed",
                    &json!({ "error": error.to_string() }),
                );
                let error = PageError::from(error);
                self.inner
                    .show_notice(NoticeLevel::Error, error.user_message());
                Err(error)
            },
        }
    }

    /// Dispatch a dashboard interaction, as if its control was used.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the page is shutting down.
    pub fn dispatch(&self, intent: Intent) -> Result<EffectHandle> {
        Ok(self.inner.store.send(PageAction::Dashboard(intent))?)
    }

    /// Show a notice that dismisses itself after the configured duration.
    pub fn show_notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.inner.show_notice(level, message.into());
    }

    /// Auth state the page last rendered.
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.inner.store.state(|state| state.auth.clone())
    }

    /// Currently visible notices.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.inner.store.state(|state| state.notices.clone())
    }

    /// The page store, for observing effect-produced actions.
    #[must_use]
    pub fn store(&self) -> &PageStore {
        &self.inner.store
    }

    /// Whether the provider subscription is live.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Cancel the subscription. Safe to call repeatedly.
    pub fn cleanup(&self) {
        let subscription = self.inner.subscription.lock().take();
        let notice_sync = self.inner.notice_sync.lock().take();

        if let Some(task) = notice_sync {
            task.abort();
        }

        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            self.inner.log.info("Page cleaned up");
        }
    }
}

impl<P, V> Drop for PageController<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl<P, V> std::fmt::Debug for PageController<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("subscribed", &self.is_subscribed())
            .field("auth", &self.auth_state())
            .finish_non_exhaustive()
    }
}

impl<P, V> Inner<P, V>
where
    P: IdentityProvider + 'static,
    V: ViewPort + 'static,
{
    /// Provider callback. Runs synchronously within the notification.
    fn on_auth_state(&self, state: &AuthState) {
        if let Err(error) = self.render(state) {
            self.log.error_with(
                "Failed to render auth state",
                &json!({ "signed_in": state.is_signed_in(), "error": error.to_string() }),
            );
            *self.render_failure.lock() = Some(error);
        }
    }

    fn render(&self, state: &AuthState) -> Result<()> {
        self.store
            .send(PageAction::AuthStateChanged(state.clone()))?;

        let (auth_section, main_content) = self
            .store
            .state(|page| (page.auth_section.clone(), page.main_content.clone()));

        self.viewport.replace(Region::AuthSection, auth_section);
        self.viewport.replace(Region::MainContent, main_content.clone());
        self.bind_intents(&main_content);

        if state.is_signed_in() {
            let button = &self.store.environment().config.sign_out_button_id;
            self.sign_out
                .setup_sign_out_button(self.viewport.as_ref(), button);
        }

        self.log.debug_with(
            "Rendered auth state",
            &json!({
                "signed_in": state.is_signed_in(),
                "user_id": state.user().map(|user| user.id.as_str()),
            }),
        );
        Ok(())
    }

    fn bind_intents(&self, fragment: &crate::view::Fragment) {
        for (element_id, intent) in fragment.intents() {
            let event = match intent {
                Intent::Search(_) => UiEvent::Submit,
                _ => UiEvent::Click,
            };

            let store = self.store.clone();
            let intent = intent.clone();
            let log = self.log;
            self.viewport.bind(
                element_id,
                event,
                handler(move |payload| {
                    let intent = intent.clone().with_payload(payload);
                    let store = store.clone();
                    async move {
                        log.info_with(
                            "Dashboard interaction",
                            &json!({ "intent": intent.label() }),
                        );
                        if let Err(error) = store.send(PageAction::Dashboard(intent)) {
                            log.warn_with(
                                "Dropped dashboard interaction",
                                &json!({ "error": error.to_string() }),
                            );
                        }
                    }
                }),
            );
        }
    }

    fn show_notice(&self, level: NoticeLevel, message: String) {
        match self.store.send(PageAction::ShowNotice { level, message }) {
            Ok(_) => self.mount_notices(),
            Err(error) => self.log.warn_with(
                "Could not show notice",
                &json!({ "error": error.to_string() }),
            ),
        }
    }

    fn mount_notices(&self) {
        let fragment = self.store.state(|page| render_notices(&page.notices));
        self.viewport.replace(Region::Notices, fragment);
    }

    /// Keep the notice region in step with effect-produced notice actions
    /// (capability notices, auto-dismissal).
    fn start_notice_sync(self: &Arc<Self>) {
        if self.notice_sync.lock().is_some() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.log.warn("No tokio runtime; notices will not refresh");
            return;
        };

        let mut actions = self.store.subscribe_actions();
        let weak = Arc::downgrade(self);
        let task = runtime.spawn(async move {
            loop {
                match actions.recv().await {
                    Ok(PageAction::ShowNotice { .. } | PageAction::DismissNotice(_))
                    | Err(RecvError::Lagged(_)) => match weak.upgrade() {
                        Some(inner) => inner.mount_notices(),
                        None => break,
                    },
                    Ok(_) => {},
                    Err(RecvError::Closed) => break,
                }
            }
        });

        *self.notice_sync.lock() = Some(task);
    }
}

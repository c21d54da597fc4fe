//! Page state machine.
//!
//! The page has no state of its own beyond what the last auth notification
//! said, the fragments rendered from it, and the visible notices.

use crate::capabilities::{ComingSoon, DashboardCapabilities, invoke};
use crate::config::PageConfig;
use crate::render::{render_auth_section, render_main_content};
use crate::view::{Fragment, Intent};
use lexicon_core::environment::{Clock, SystemClock};
use lexicon_core::{DateTime, SmallVec, Utc, effect::Effect, reducer::Reducer, smallvec};
use lexicon_identity::AuthState;
use std::sync::Arc;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information
    Info,
    /// Something worked
    Success,
    /// Something failed
    Error,
}

/// A visible, time-limited notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Page-unique id
    pub id: u64,
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the user
    pub message: String,
    /// When it was raised
    pub created_at: DateTime<Utc>,
}

/// Everything the page currently shows.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Last delivered auth state
    pub auth: AuthState,
    /// Rendered header region
    pub auth_section: Fragment,
    /// Rendered main region
    pub main_content: Fragment,
    /// Visible notices, oldest first
    pub notices: Vec<Notice>,
    /// Id for the next notice
    pub next_notice_id: u64,
}

/// Page inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    /// The identity provider delivered a state.
    AuthStateChanged(AuthState),
    /// A dashboard control was used.
    Dashboard(Intent),
    /// Raise a notice; it dismisses itself after the configured duration.
    ShowNotice {
        /// Severity
        level: NoticeLevel,
        /// Text
        message: String,
    },
    /// Remove a notice (unknown ids are ignored).
    DismissNotice(u64),
}

/// Dependencies of [`PageReducer`].
#[derive(Clone)]
pub struct PageEnvironment {
    /// Timing and element ids
    pub config: PageConfig,
    /// Dashboard slots
    pub capabilities: Arc<dyn DashboardCapabilities>,
    /// Notice timestamps
    pub clock: Arc<dyn Clock>,
}

impl PageEnvironment {
    /// Environment with placeholder capabilities and the system clock.
    #[must_use]
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            capabilities: Arc::new(ComingSoon::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Plug in dashboard behaviour.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Arc<dyn DashboardCapabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Use a different clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for PageEnvironment {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

impl std::fmt::Debug for PageEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reducer for the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageReducer;

impl Reducer for PageReducer {
    type State = PageState;
    type Action = PageAction;
    type Environment = PageEnvironment;

    fn reduce(
        &self,
        state: &mut PageState,
        action: PageAction,
        env: &PageEnvironment,
    ) -> SmallVec<[Effect<PageAction>; 4]> {
        match action {
            PageAction::AuthStateChanged(auth) => {
                // Both regions follow every transition; signing out resets
                // the main region to the welcome view.
                state.auth_section = render_auth_section(&auth);
                state.main_content = render_main_content(&auth);
                state.auth = auth;
                smallvec![Effect::None]
            },

            PageAction::Dashboard(intent) => {
                if !state.auth.is_signed_in() {
                    return smallvec![Effect::None];
                }
                if matches!(&intent, Intent::Search(query) if query.trim().is_empty()) {
                    return smallvec![Effect::None];
                }

                let capabilities = Arc::clone(&env.capabilities);
                smallvec![Effect::future(async move {
                    invoke(capabilities.as_ref(), &intent);
                    Some(PageAction::ShowNotice {
                        level: NoticeLevel::Info,
                        message: format!("{} is coming soon!", intent.label()),
                    })
                })]
            },

            PageAction::ShowNotice { level, message } => {
                let id = state.next_notice_id;
                state.next_notice_id += 1;
                state.notices.push(Notice {
                    id,
                    level,
                    message,
                    created_at: env.clock.now(),
                });

                smallvec![Effect::Delay {
                    duration: env.config.notice_duration,
                    action: Box::new(PageAction::DismissNotice(id)),
                }]
            },

            PageAction::DismissNotice(id) => {
                state.notices.retain(|notice| notice.id != id);
                smallvec![Effect::None]
            },
        }
    }
}

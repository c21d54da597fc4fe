//! Page controller configuration.

use crate::render::SIGN_OUT_BUTTON_ID;
use std::time::Duration;

/// Page controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// How long `initialize` waits for the first auth state.
    ///
    /// Default: 10 seconds
    pub init_timeout: Duration,

    /// How long a notice stays visible.
    ///
    /// Default: 5 seconds
    pub notice_duration: Duration,

    /// Element the sign-out action is wired to.
    ///
    /// Default: `signout-btn`
    pub sign_out_button_id: String,
}

impl PageConfig {
    /// Set the first-paint timeout.
    #[must_use]
    pub const fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Set how long notices stay visible.
    #[must_use]
    pub const fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    /// Wire sign-out to a different element.
    #[must_use]
    pub fn with_sign_out_button_id(mut self, id: impl Into<String>) -> Self {
        self.sign_out_button_id = id.into();
        self
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            init_timeout: Duration::from_secs(10),
            notice_duration: Duration::from_secs(5),
            sign_out_button_id: SIGN_OUT_BUTTON_ID.to_string(),
        }
    }
}

//! Sign-out control wiring.

use crate::viewport::{UiEvent, ViewPort, handler};
use lexicon_core::Logger;
use lexicon_identity::IdentityProvider;
use serde_json::json;
use std::sync::Arc;

/// Wires a sign-out control to the identity provider.
pub struct SignOutAction<P> {
    provider: Arc<P>,
    log: Logger,
}

impl<P: IdentityProvider + 'static> SignOutAction<P> {
    /// Create the action for `provider`.
    #[must_use]
    pub const fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            log: Logger::new("SignOutAction"),
        }
    }

    /// Bind a click handler on `element_id` that signs the user out.
    ///
    /// Returns `false` (after logging a warning) if the element is not
    /// mounted. Calling it again replaces the previous handler, so one
    /// click always triggers exactly one sign-out.
    pub fn setup_sign_out_button<V>(&self, viewport: &V, element_id: &str) -> bool
    where
        V: ViewPort + ?Sized,
    {
        if !viewport.contains(element_id) {
            self.log.warn_with(
                "Sign-out button not found",
                &json!({ "element_id": element_id }),
            );
            return false;
        }

        let provider = Arc::clone(&self.provider);
        let log = self.log;
        let id = element_id.to_string();

        let bound = viewport.bind(
            element_id,
            UiEvent::Click,
            handler(move |_| {
                let provider = Arc::clone(&provider);
                let id = id.clone();
                async move {
                    log.info_with("Sign-out requested", &json!({ "element_id": id }));
                    match provider.sign_out().await {
                        Ok(()) => log.info_with("User signed out", &json!({ "element_id": id })),
                        Err(error) => log.error_with(
                            "Sign-out failed",
                            &json!({ "element_id": id, "error": error.to_string() }),
                        ),
                    }
                }
            }),
        );

        if bound {
            self.log
                .debug_with("Sign-out button wired", &json!({ "element_id": element_id }));
        }
        bound
    }
}

impl<P> std::fmt::Debug for SignOutAction<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOutAction").finish_non_exhaustive()
    }
}

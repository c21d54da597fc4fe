//! Page controller errors.

use lexicon_identity::AuthError;
use lexicon_runtime::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for page operations.
pub type Result<T> = std::result::Result<T, PageError>;

/// Failures surfaced by [`PageController`](crate::PageController).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    /// No auth state arrived before the first-paint deadline.
    #[error("No auth state within {0:?}")]
    InitTimeout(Duration),

    /// The identity provider reported a failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The page store rejected an action.
    #[error("Page store unavailable: {0}")]
    Store(#[from] StoreError),
}

impl PageError {
    /// Message suitable for a notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InitTimeout(_) => {
                "We could not confirm your sign-in status. Please reload the page.".to_string()
            },
            Self::Auth(error) => error.user_message(),
            Self::Store(_) => "Something went wrong. Please reload the page.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_keep_their_user_message() {
        let error = PageError::from(AuthError::PopupClosed);
        assert_eq!(error.user_message(), "Sign-in was cancelled.");
        assert_eq!(error.to_string(), "Sign-in was cancelled");
    }

    #[test]
    fn test_timeout_message_is_actionable() {
        let error = PageError::InitTimeout(Duration::from_secs(10));
        assert!(error.user_message().contains("reload"));
        assert!(error.to_string().contains("10s"));
    }
}

//! Error types for identity provider operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Broad failure category, used to decide how the UI degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network hiccups and timeouts; retrying may help.
    Transient,
    /// The platform refused the user or the app.
    Permission,
    /// The request or credential was malformed or rejected.
    Validation,
    /// Anything we did not expect.
    Internal,
}

/// Failures surfaced by identity adapters.
///
/// Adapters return these as values; nothing crosses the adapter boundary
/// as a panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Transient
    // ═══════════════════════════════════════════════════════════

    /// Transport-level failure talking to the identity platform.
    #[error("Network error: {message}")]
    Network {
        /// What went wrong
        message: String,
    },

    /// The platform did not answer in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    // ═══════════════════════════════════════════════════════════
    // Permission
    // ═══════════════════════════════════════════════════════════

    /// The user dismissed the consent window.
    #[error("Sign-in was cancelled")]
    PopupClosed,

    /// Account disabled, provider not enabled, and similar refusals.
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        /// Platform-supplied reason
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════

    /// The credential was rejected (expired, forged, wrong audience).
    #[error("Invalid credential: {reason}")]
    InvalidCredential {
        /// Platform-supplied reason
        reason: String,
    },

    /// The request itself was invalid (missing field, bad configuration).
    #[error("Invalid request: {reason}")]
    Validation {
        /// What was invalid
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════

    /// Unexpected failure (should not be shown verbatim to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Shorthand for [`AuthError::Network`].
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Shorthand for [`AuthError::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Category of this failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lexicon_identity::{AuthError, ErrorKind};
    /// assert_eq!(AuthError::network("offline").kind(), ErrorKind::Transient);
    /// assert_eq!(AuthError::PopupClosed.kind(), ErrorKind::Permission);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout(_) => ErrorKind::Transient,
            Self::PopupClosed | Self::PermissionDenied { .. } => ErrorKind::Permission,
            Self::InvalidCredential { .. } | Self::Validation { .. } => ErrorKind::Validation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if retrying the same operation may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Message suitable for a notification banner.
    ///
    /// Internal details are not leaked; everything else keeps its detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
            Self::PopupClosed => "Sign-in was cancelled.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AuthError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            AuthError::PermissionDenied {
                reason: "USER_DISABLED".into()
            }
            .kind(),
            ErrorKind::Permission
        );
        assert_eq!(
            AuthError::InvalidCredential {
                reason: "TOKEN_EXPIRED".into()
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(AuthError::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_transient() {
        assert!(AuthError::network("offline").is_transient());
        assert!(!AuthError::PopupClosed.is_transient());
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let message = AuthError::internal("mutex poisoned at line 12").user_message();
        assert!(!message.contains("mutex"));

        let message = AuthError::network("connection refused").user_message();
        assert_eq!(message, "Network error: connection refused");
    }
}

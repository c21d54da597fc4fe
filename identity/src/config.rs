//! Hosted identity backend configuration.
//!
//! Values are supplied by the application; `from_env` reads the
//! `LEXICON_IDENTITY_*` variables for deployments that configure through
//! the environment.

use crate::error::{AuthError, Result};
use std::time::Duration;

/// Environment variable holding the platform API key.
pub const ENV_API_KEY: &str = "LEXICON_IDENTITY_API_KEY";
/// Environment variable overriding the REST base URL.
pub const ENV_BASE_URL: &str = "LEXICON_IDENTITY_BASE_URL";
/// Environment variable overriding the sign-in request URI.
pub const ENV_REQUEST_URI: &str = "LEXICON_IDENTITY_REQUEST_URI";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "LEXICON_IDENTITY_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_REQUEST_URI: &str = "http://localhost";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity Toolkit REST configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToolkitConfig {
    /// Public API key of the identity project.
    pub api_key: String,

    /// REST base URL (no trailing slash).
    ///
    /// Default: `https://identitytoolkit.googleapis.com`
    pub base_url: String,

    /// URI the IdP credential is bound to (`requestUri`).
    ///
    /// Default: `http://localhost`
    pub request_uri: String,

    /// Per-request timeout.
    ///
    /// Default: 10 seconds
    pub timeout: Duration,
}

impl IdentityToolkitConfig {
    /// Create a configuration for `api_key` with default endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_uri: DEFAULT_REQUEST_URI.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point at a different REST host (emulator, proxy).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request URI sent with IdP credentials.
    #[must_use]
    pub fn with_request_uri(mut self, request_uri: impl Into<String>) -> Self {
        self.request_uri = request_uri.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from `LEXICON_IDENTITY_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the API key is missing or the
    /// timeout is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AuthError::Validation {
                reason: format!("MISSING_API_KEY: {ENV_API_KEY} is not set"),
            })?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        if let Some(request_uri) = lookup(ENV_REQUEST_URI) {
            config = config.with_request_uri(request_uri);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| AuthError::Validation {
                    reason: format!("INVALID_TIMEOUT: {ENV_TIMEOUT_SECS}={raw}"),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// `{base_url}/v1/accounts:{method}?key={api_key}`
    pub(crate) fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{method}?key={}",
            self.base_url, self.api_key
        )
    }
}

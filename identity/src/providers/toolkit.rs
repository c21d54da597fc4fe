//! Identity Toolkit REST backend.
//!
//! Exchanges a Google ID token for a platform session through
//! `accounts:signInWithIdp` and revalidates a persisted session through
//! `accounts:lookup`. The Google token itself comes from an injected
//! [`GoogleCredentialSource`] (consent popup, device flow, fixture).

use crate::config::IdentityToolkitConfig;
use crate::error::{AuthError, Result};
use crate::providers::IdentityBackend;
use crate::state::User;
use lexicon_core::Logger;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;

/// Source of Google ID tokens.
pub trait GoogleCredentialSource: Send + Sync + 'static {
    /// Obtain a Google ID token.
    ///
    /// Resolves to `Ok(None)` when the user dismissed the consent window.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the token could not be obtained.
    fn google_id_token(&self) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Credential source that always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticIdToken {
    token: String,
}

impl StaticIdToken {
    /// Wrap a pre-issued Google ID token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl GoogleCredentialSource for StaticIdToken {
    async fn google_id_token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// Platform session tokens held after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    id_token: String,
    refresh_token: Option<String>,
}

/// [`IdentityBackend`] over the Identity Toolkit REST API.
#[derive(Debug)]
pub struct IdentityToolkitBackend<C: GoogleCredentialSource> {
    config: IdentityToolkitConfig,
    http: Client,
    credentials: C,
    session: Mutex<Option<Session>>,
    log: Logger,
}

impl<C: GoogleCredentialSource> IdentityToolkitBackend<C> {
    /// Create a backend; no request is made until first use.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for an empty API key and
    /// [`AuthError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: IdentityToolkitConfig, credentials: C) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AuthError::Validation {
                reason: "MISSING_API_KEY".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            credentials,
            session: Mutex::new(None),
            log: Logger::new("IdentityToolkit"),
        })
    }

    /// Seed a session persisted by a previous run, to be validated by
    /// [`IdentityBackend::restore_session`].
    #[must_use]
    pub fn with_persisted_token(self, id_token: impl Into<String>) -> Self {
        *self.session.lock() = Some(Session {
            id_token: id_token.into(),
            refresh_token: None,
        });
        self
    }

    /// The platform ID token of the current session, for persistence.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.id_token.clone())
    }

    /// The refresh token of the current session, if the platform issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.session
            .lock()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    async fn post<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.config.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::network(format!("{method} returned HTTP {status}")));
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let code = parse_error_code(&text);
            self.log.warn_with(
                "Identity platform rejected request",
                &json!({ "method": method, "status": status.as_u16(), "code": code }),
            );
            return Err(code.map_or_else(
                || AuthError::internal(format!("{method} failed with HTTP {status}")),
                |code| map_error_code(&code),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| AuthError::internal(format!("Unparseable {method} response: {e}")))
    }

    /// The request URL carries the API key, so it never reaches the message.
    fn transport_error(&self, error: reqwest::Error) -> AuthError {
        if error.is_timeout() {
            AuthError::Timeout(self.config.timeout)
        } else {
            AuthError::network(error.without_url().to_string())
        }
    }
}

impl<C: GoogleCredentialSource> IdentityBackend for IdentityToolkitBackend<C> {
    async fn sign_in_with_google(&self) -> Result<User> {
        let Some(google_token) = self.credentials.google_id_token().await? else {
            return Err(AuthError::PopupClosed);
        };

        let request = SignInWithIdpRequest {
            post_body: idp_post_body(&google_token)?,
            request_uri: self.config.request_uri.clone(),
            return_secure_token: true,
            return_idp_credential: true,
        };

        let response: SignInWithIdpResponse = self.post("signInWithIdp", &request).await?;

        *self.session.lock() = Some(Session {
            id_token: response.id_token.clone(),
            refresh_token: response.refresh_token.clone(),
        });

        self.log.debug_with(
            "Platform session established",
            &json!({ "local_id": response.local_id, "new_user": response.is_new_user }),
        );

        Ok(response.into_user())
    }

    async fn sign_out(&self) -> Result<()> {
        // Platform sessions are bearer tokens; signing out discards them.
        self.session.lock().take();
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<User>> {
        let Some(id_token) = self.session_token() else {
            return Ok(None);
        };

        let request = LookupRequest { id_token };
        match self.post::<_, LookupResponse>("lookup", &request).await {
            Ok(response) => Ok(response.users.into_iter().next().map(AccountInfo::into_user)),
            Err(AuthError::InvalidCredential { reason }) => {
                self.log.info_with(
                    "Persisted session is no longer valid",
                    &json!({ "reason": reason }),
                );
                self.session.lock().take();
                Ok(None)
            },
            Err(error) => Err(error),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpRequest {
    post_body: String,
    request_uri: String,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    is_new_user: bool,
}

impl SignInWithIdpResponse {
    fn into_user(self) -> User {
        User {
            id: crate::state::UserId(self.local_id),
            display_name: self.display_name,
            email: self.email,
            photo_url: self.photo_url,
            email_verified: self.email_verified,
            is_anonymous: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    provider_user_info: Vec<serde_json::Value>,
}

impl AccountInfo {
    fn into_user(self) -> User {
        User {
            id: crate::state::UserId(self.local_id),
            display_name: self.display_name,
            email: self.email,
            photo_url: self.photo_url,
            email_verified: self.email_verified,
            is_anonymous: self.provider_user_info.is_empty(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Form-encoded `postBody` for `signInWithIdp`.
fn idp_post_body(google_token: &str) -> Result<String> {
    serde_urlencoded::to_string([("id_token", google_token), ("providerId", "google.com")])
        .map_err(|e| AuthError::internal(format!("Failed to encode postBody: {e}")))
}

/// Extract the platform error code from an error response body.
///
/// Messages look like `"TOKEN_EXPIRED"` or
/// `"INVALID_IDP_RESPONSE : Invalid Idp Response"`.
fn parse_error_code(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let code = envelope
        .error
        .message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_string();
    (!code.is_empty()).then_some(code)
}

/// Map a platform error code onto the [`AuthError`] taxonomy.
#[must_use]
pub fn map_error_code(code: &str) -> AuthError {
    match code {
        "INVALID_IDP_RESPONSE" | "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => {
            AuthError::InvalidCredential {
                reason: code.to_string(),
            }
        },
        "USER_DISABLED" | "OPERATION_NOT_ALLOWED" => AuthError::PermissionDenied {
            reason: code.to_string(),
        },
        other if other.starts_with("MISSING_") || other.starts_with("INVALID_") => {
            AuthError::Validation {
                reason: other.to_string(),
            }
        },
        other => AuthError::internal(format!("Identity platform error: {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Cancelled;

    impl GoogleCredentialSource for Cancelled {
        async fn google_id_token(&self) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            map_error_code("TOKEN_EXPIRED"),
            AuthError::InvalidCredential { .. }
        ));
        assert!(matches!(
            map_error_code("INVALID_IDP_RESPONSE"),
            AuthError::InvalidCredential { .. }
        ));
        assert!(matches!(
            map_error_code("USER_DISABLED"),
            AuthError::PermissionDenied { .. }
        ));
        assert!(matches!(
            map_error_code("OPERATION_NOT_ALLOWED"),
            AuthError::PermissionDenied { .. }
        ));
        assert!(matches!(
            map_error_code("MISSING_REQUEST_URI"),
            AuthError::Validation { .. }
        ));
        assert!(matches!(
            map_error_code("INVALID_API_KEY"),
            AuthError::Validation { .. }
        ));
        assert!(matches!(
            map_error_code("QUOTA_EXCEEDED"),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_parse_error_code() {
        let body = r#"{"error":{"code":400,"message":"INVALID_IDP_RESPONSE : Invalid Idp Response","errors":[]}}"#;
        assert_eq!(parse_error_code(body).as_deref(), Some("INVALID_IDP_RESPONSE"));

        let body = r#"{"error":{"code":400,"message":"TOKEN_EXPIRED"}}"#;
        assert_eq!(parse_error_code(body).as_deref(), Some("TOKEN_EXPIRED"));

        assert_eq!(parse_error_code("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_sign_in_response_maps_to_user() {
        let response: SignInWithIdpResponse = serde_json::from_str(
            r#"{
                "localId": "abc123",
                "idToken": "platform-token",
                "refreshToken": "refresh",
                "email": "ann@example.com",
                "displayName": "Ann",
                "emailVerified": true
            }"#,
        )
        .unwrap();

        let user = response.into_user();
        assert_eq!(user.id.as_str(), "abc123");
        assert_eq!(user.display_name.as_deref(), Some("Ann"));
        assert!(user.email_verified);
        assert!(!user.is_anonymous);
    }

    #[test]
    fn test_lookup_without_linked_provider_is_anonymous() {
        let response: LookupResponse =
            serde_json::from_str(r#"{"users":[{"localId":"guest"}]}"#).unwrap();
        let user = response.users.into_iter().next().unwrap().into_user();
        assert!(user.is_anonymous);
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = IdentityToolkitBackend::new(
            IdentityToolkitConfig::new("  "),
            StaticIdToken::new("t"),
        );
        assert!(matches!(result, Err(AuthError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_consent_is_popup_closed() {
        let backend =
            IdentityToolkitBackend::new(IdentityToolkitConfig::new("key"), Cancelled).unwrap();
        let result = backend.sign_in_with_google().await;
        assert_eq!(result.unwrap_err(), AuthError::PopupClosed);
    }

    #[tokio::test]
    async fn test_restore_without_session_makes_no_request() {
        let backend = IdentityToolkitBackend::new(
            IdentityToolkitConfig::new("key").with_base_url("http://127.0.0.1:1"),
            StaticIdToken::new("t"),
        )
        .unwrap();
        assert_eq!(backend.restore_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_platform_is_a_network_error() {
        let backend = IdentityToolkitBackend::new(
            IdentityToolkitConfig::new("key").with_base_url("http://127.0.0.1:1"),
            StaticIdToken::new("t"),
        )
        .unwrap();

        let error = backend.sign_in_with_google().await.unwrap_err();
        assert!(error.is_transient(), "unexpected error: {error:?}");
        assert_eq!(backend.session_token(), None);
    }

    #[tokio::test]
    async fn test_network_error_does_not_expose_api_key() {
        let backend = IdentityToolkitBackend::new(
            IdentityToolkitConfig::new("SECRET-API-KEY").with_base_url("http://127.0.0.1:1"),
            StaticIdToken::new("t"),
        )
        .unwrap();

        let error = backend.sign_in_with_google().await.unwrap_err();
        assert!(!error.to_string().contains("SECRET-API-KEY"), "{error}");
        assert!(!error.user_message().contains("SECRET-API-KEY"));
        assert!(!error.user_message().contains("key="));
    }

    #[test]
    fn test_post_body_is_form_encoded() {
        let body = idp_post_body("a+b&providerId=evil=").unwrap();
        assert_eq!(
            body,
            "id_token=a%2Bb%26providerId%3Devil%3D&providerId=google.com"
        );

        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(&body).unwrap();
        assert_eq!(decoded[0], ("id_token".into(), "a+b&providerId=evil=".into()));
        assert_eq!(decoded[1], ("providerId".into(), "google.com".into()));
    }

    #[tokio::test]
    async fn test_sign_out_discards_session() {
        let backend = IdentityToolkitBackend::new(
            IdentityToolkitConfig::new("key"),
            StaticIdToken::new("t"),
        )
        .unwrap()
        .with_persisted_token("platform-token");

        assert_eq!(backend.session_token().as_deref(), Some("platform-token"));
        backend.sign_out().await.unwrap();
        assert_eq!(backend.session_token(), None);
    }
}

//! Test doubles for identity adapters.
//!
//! - [`MockIdentityProvider`]: a full [`IdentityProvider`](crate::IdentityProvider)
//!   with configurable latency and failure injection
//! - [`MockIdentityBackend`]: a scripted [`IdentityBackend`](crate::IdentityBackend)
//!   for exercising [`HostedIdentityProvider`](crate::providers::HostedIdentityProvider)

use crate::state::User;

pub mod backend;
pub mod identity;

pub use backend::MockIdentityBackend;
pub use identity::{FailureInjection, MockConfig, MockIdentityProvider};

/// The canned user both mocks sign in as.
#[must_use]
pub fn demo_user() -> User {
    User::new("mock-user-123")
        .with_display_name("Demo User")
        .with_email("demo@example.com")
        .verified(true)
}

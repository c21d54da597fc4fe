//! # Lexicon Identity
//!
//! The seam between Lexicon and an external identity platform.
//!
//! ## Features
//!
//! - **Replay-latest observation**: subscribing immediately yields the
//!   current [`AuthState`], then every transition in order
//! - **Failure isolation**: a panicking listener is logged and skipped
//! - **Tagged failures**: adapter operations return [`AuthError`], never panic
//! - **Substitutable**: the [`IdentityProvider`] trait has a hosted
//!   implementation and a deterministic mock
//!
//! ## Architecture
//!
//! ```text
//! IdentityBackend ──► HostedIdentityProvider ─┐
//!                                             ├─► AuthStateHolder ──► listeners
//!                     MockIdentityProvider ───┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use lexicon_identity::{IdentityProvider, listener};
//! use lexicon_identity::mocks::{MockConfig, MockIdentityProvider};
//!
//! let provider = MockIdentityProvider::new(MockConfig::default().with_seed(7));
//! let subscription = provider.subscribe(listener(|state| println!("{state:?}")));
//!
//! match provider.sign_in_with_google().await {
//!     Ok(user) => println!("hello {}", user.id),
//!     Err(error) => eprintln!("{}", error.user_message()),
//! }
//!
//! subscription.unsubscribe();
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod error;
pub mod holder;
pub mod providers;
pub mod registry;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use config::IdentityToolkitConfig;
pub use error::{AuthError, ErrorKind, Result};
pub use holder::AuthStateHolder;
pub use providers::{IdentityBackend, IdentityProvider};
pub use registry::{Listener, ListenerId, Subscription, listener};
pub use state::{AuthState, User, UserId};

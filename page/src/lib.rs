//! # Lexicon Page
//!
//! The auth-aware landing page: a header that shows either sign-in links or
//! the signed-in profile, and a main region that shows either a welcome hero
//! or the vocabulary dashboard.
//!
//! ## Architecture
//!
//! Rendering is a pure function of [`AuthState`](lexicon_identity::AuthState).
//! [`PageReducer`] holds the rendered fragments and notices;
//! [`PageController`] feeds it provider notifications and mounts the result
//! on a [`ViewPort`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use lexicon_page::{MemoryViewPort, PageController, PageEnvironment};
//!
//! let controller = PageController::new(provider, Arc::new(MemoryViewPort::new()), PageEnvironment::default());
//! controller.initialize().await?;
//! // ... user clicks around ...
//! controller.cleanup();
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod error;
pub mod reducer;
pub mod render;
pub mod sign_out;
pub mod view;
pub mod viewport;

pub use capabilities::{ComingSoon, DashboardCapabilities};
pub use config::PageConfig;
pub use controller::{PageController, PageStore};
pub use error::{PageError, Result};
pub use reducer::{Notice, NoticeLevel, PageAction, PageEnvironment, PageReducer, PageState};
pub use sign_out::SignOutAction;
pub use view::{Element, ElementKind, Fragment, Intent};
pub use viewport::{Handler, MemoryViewPort, Region, UiEvent, ViewPort, handler};

//! # Lexicon Testing
//!
//! Testing utilities and helpers for Lexicon crates.
//!
//! This crate provides:
//! - Deterministic mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - A `tracing` layer that captures log records for assertions
//!
//! ## Example
//!
//! ```ignore
//! use lexicon_testing::{LogCapture, test_clock};
//!
//! #[tokio::test]
//! async fn warns_when_button_missing() {
//!     let logs = LogCapture::new();
//!     let _guard = logs.install();
//!
//!     sign_out.setup_sign_out_button(&viewport, "missing");
//!
//!     assert!(logs.contains(tracing::Level::WARN, "SignOutAction", "not found"));
//! }
//! ```

use chrono::{DateTime, Utc};
use lexicon_core::environment::Clock;

/// Fluent reducer tests
pub mod reducer_test;

/// Log capture layer
pub mod log_capture;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use lexicon_testing::mocks::FixedClock;
    /// use lexicon_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

// Re-export commonly used items
pub use log_capture::{CapturedRecord, LogCapture};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

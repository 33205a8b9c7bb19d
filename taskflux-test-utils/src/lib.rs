// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for Taskflux.
//!
//! Meant for development and testing only.
//!
//! # Key Types
//!
//! - [`delayed_success`], [`delayed_failure`] and [`delayed_cancellation`]
//!   build operations that settle after a fixed delay on the tokio runtime.
//! - [`TestError`] is the error type the fixtures fail with.
//! - [`UnobservedFailureRecorder`] counts failures that reach the process-wide
//!   unobserved-failure hook while it is alive.
//! - [`weather`] holds a small city/forecast data set for scenario tests.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use taskflux_core::Outcome;
//! use taskflux_test_utils::delayed_success;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let operation = delayed_success("done", Duration::from_millis(5));
//! assert!(matches!(operation.await, Outcome::Succeeded("done")));
//! # }
//! ```

pub mod delayed;
pub mod test_error;
pub mod unobserved_recorder;
pub mod weather;

pub use delayed::{delayed_cancellation, delayed_failure, delayed_outcome, delayed_success};
pub use test_error::TestError;
pub use unobserved_recorder::UnobservedFailureRecorder;

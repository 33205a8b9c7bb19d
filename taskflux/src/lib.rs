// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Taskflux
//!
//! Composable primitives for orchestrating collections of independent
//! asynchronous operations.
//!
//! ## Overview
//!
//! An [`Operation`] is a cloneable handle to work in progress that ends in
//! exactly one [`Outcome`]: a value, a [`TaskError`], or cancellation. A
//! [`CompletionSource`] manufactures an operation and fulfils it once.
//! On top of that Taskflux provides:
//!
//! - [`drain`]: process operations one by one as they finish,
//! - [`order_by_completion`]: handles that resolve in completion order,
//! - [`for_each_async`]: bounded-parallelism fan-out over a sequence,
//!   with [`for_each_async_collect`] aggregating per-item failures and
//!   [`for_each_async_all`] stopping each worker at its first failure,
//! - [`with_timeout`]: a deadline that never loses a late failure.
//!
//! Failures that nobody observes are reported through
//! [`unobserved::set_unobserved_failure_hook`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io;
//! use std::time::Duration;
//! use taskflux::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TaskError> {
//!     let lookups = ["Oslo", "Cairo", "Lima"].map(|city| {
//!         Operation::spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(city.len() as u64 * 10)).await;
//!             Ok::<_, io::Error>(city)
//!         })
//!     });
//!
//!     let mut finished = Vec::new();
//!     lookups
//!         .drain_one_by_one(|_, city| finished.push(*city))
//!         .await?;
//!
//!     assert_eq!(finished.len(), 3);
//!     Ok(())
//! }
//! ```

pub use taskflux_core::{
    adopt, rebroadcast, tag, unobserved, CancellationToken, CompletionSource, IntoTaskError,
    Operation, Outcome, Result, Runtime, TaskError, Timer,
};
pub use taskflux_exec::{
    drain, drain_with, for_each_async_all_on, for_each_async_collect_on, for_each_async_on,
    for_each_async_ordered_on, order_by_completion, order_by_completion_with, with_timeout_on, CompletionOrder,
};

#[cfg(feature = "runtime-tokio")]
pub use taskflux_core::DefaultRuntime;
#[cfg(feature = "runtime-tokio")]
pub use taskflux_exec::{
    for_each_async, for_each_async_all, for_each_async_collect, for_each_async_ordered,
    with_timeout,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use taskflux_core::{CancellationToken, CompletionSource, Operation, Outcome, TaskError};
    pub use taskflux_exec::{DrainExt, OrderByCompletionExt};

    #[cfg(feature = "runtime-tokio")]
    pub use taskflux_exec::{ForEachAsyncExt, WithTimeoutExt};
}

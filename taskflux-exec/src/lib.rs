// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Executors over collections of [`Operation`](taskflux_core::Operation)s.
//!
//! - [`drain()`] consumes operations one by one as they finish.
//! - [`order_by_completion()`] re-sequences operations by completion time.
//! - [`for_each_async()`] and friends fan a sequence out over a bounded number
//!   of workers.
//! - [`with_timeout()`] races an operation against a deadline without losing
//!   its failure.
//!
//! Ties between operations finishing at the same moment are broken
//! arbitrarily; callers must not rely on any order among them.

#[macro_use]
mod logging;

pub mod drain;
pub mod for_each_async;
pub mod order_by_completion;
pub mod with_timeout;

pub use drain::{drain, drain_with, DrainExt};
pub use for_each_async::{
    for_each_async_all_on, for_each_async_collect_on, for_each_async_on,
    for_each_async_ordered_on,
};
pub use order_by_completion::{
    order_by_completion, order_by_completion_with, CompletionOrder, OrderByCompletionExt,
};
pub use with_timeout::with_timeout_on;

#[cfg(feature = "runtime-tokio")]
pub use for_each_async::{
    for_each_async, for_each_async_all, for_each_async_collect, for_each_async_ordered,
    ForEachAsyncExt,
};
#[cfg(feature = "runtime-tokio")]
pub use with_timeout::{with_timeout, WithTimeoutExt};

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded-parallelism fan-out over a sequence.
//!
//! At most `degree` workers run, each processing one item at a time. Workers
//! pull their next item from a shared cursor as soon as they are free, so a
//! slow item never holds up work queued behind it on another worker.
//!
//! Four modes are available:
//!
//! - [`for_each_async`] hands out output slots in completion order. Slot `j`
//!   holds the result of the `j`-th item to finish, not of source element `j`.
//!   Carry the element in the result (or use [`order_by_completion_with`])
//!   when results must be attributed to inputs.
//! - [`for_each_async_ordered`] keeps slot `i` for source element `i`.
//! - [`for_each_async_collect`] discards values and reports every per-item
//!   failure at the end as one [`TaskError::Aggregate`].
//! - [`for_each_async_all`] discards values too, but a worker stops at its
//!   first failure while the other workers carry on.
//!
//! Each item's body runs as its own operation, so a panicking body turns into
//! a cancelled outcome instead of taking its worker down.
//!
//! [`order_by_completion_with`]: crate::order_by_completion_with
//! [`TaskError::Aggregate`]: taskflux_core::TaskError::Aggregate

mod implementation;
mod partition;

use core::future::Future;
use implementation::{fan_out, fan_out_all, fan_out_collect, SlotOrder};
use std::error::Error;
use taskflux_core::{CancellationToken, Operation, Result, Runtime};

#[cfg(feature = "runtime-tokio")]
use taskflux_core::DefaultRuntime;

/// Apply `body` to every element with at most `degree` concurrent invocations.
///
/// Returns one pending handle per element immediately. Handles are filled in
/// completion order: the first item to finish resolves handle 0.
///
/// # Errors
///
/// Returns `TaskError::ContractViolation` if `degree` is zero. No work is
/// started in that case.
///
/// # Example
///
/// ```
/// use std::io;
/// use std::time::Duration;
/// use taskflux_core::Outcome;
/// use taskflux_exec::for_each_async;
///
/// # #[tokio::main]
/// # async fn main() {
/// let handles = for_each_async(vec![40u64, 10], 2, |millis| async move {
///     tokio::time::sleep(Duration::from_millis(millis)).await;
///     Ok::<_, io::Error>(millis)
/// })
/// .unwrap();
///
/// assert!(matches!(handles[0].clone().await, Outcome::Succeeded(10)));
/// assert!(matches!(handles[1].clone().await, Outcome::Succeeded(40)));
/// # }
/// ```
#[cfg(feature = "runtime-tokio")]
pub fn for_each_async<I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Vec<Operation<U>>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    for_each_async_on::<DefaultRuntime, _, _, _, _, _, _>(source, degree, body)
}

/// [`for_each_async`] on an explicit runtime.
///
/// # Errors
///
/// Same as [`for_each_async`].
pub fn for_each_async_on<R, I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Vec<Operation<U>>>
where
    R: Runtime,
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    fan_out::<R, _, _, _, _, _, _>(source, degree, body, SlotOrder::Completion)
}

/// Like [`for_each_async`], but handle `i` always belongs to source element `i`.
///
/// # Errors
///
/// Returns `TaskError::ContractViolation` if `degree` is zero.
#[cfg(feature = "runtime-tokio")]
pub fn for_each_async_ordered<I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Vec<Operation<U>>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    for_each_async_ordered_on::<DefaultRuntime, _, _, _, _, _, _>(source, degree, body)
}

/// [`for_each_async_ordered`] on an explicit runtime.
///
/// # Errors
///
/// Same as [`for_each_async_ordered`].
pub fn for_each_async_ordered_on<R, I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Vec<Operation<U>>>
where
    R: Runtime,
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    fan_out::<R, _, _, _, _, _, _>(source, degree, body, SlotOrder::Source)
}

/// Apply `body` to every element and collect failures instead of stopping.
///
/// The returned operation succeeds once every claimed item has finished
/// without error. Otherwise it fails with `TaskError::Aggregate` holding
/// one entry per failed or cancelled item, in no particular order.
///
/// Cancelling `cancellation_token` stops workers from claiming more items;
/// items already running are left to finish. If elements were left unclaimed
/// the run ends cancelled, or, when items also failed, the aggregate carries
/// one extra `TaskError::Cancelled` entry.
///
/// # Errors
///
/// Returns `TaskError::ContractViolation` if `degree` is zero.
///
/// # Example
///
/// ```
/// use std::io;
/// use taskflux_core::{Outcome, TaskError};
/// use taskflux_exec::for_each_async_collect;
///
/// # #[tokio::main]
/// # async fn main() {
/// let run = for_each_async_collect(1..=6, 3, |n| async move {
///     if n % 3 == 0 {
///         Err(io::Error::other(format!("{n} is divisible by three")))
///     } else {
///         Ok(())
///     }
/// }, None)
/// .unwrap();
///
/// match run.await {
///     Outcome::Failed(TaskError::Aggregate { count, .. }) => assert_eq!(count, 2),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// # }
/// ```
#[cfg(feature = "runtime-tokio")]
pub fn for_each_async_collect<I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
    cancellation_token: Option<CancellationToken>,
) -> Result<Operation<()>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    for_each_async_collect_on::<DefaultRuntime, _, _, _, _, _, _>(
        source,
        degree,
        body,
        cancellation_token,
    )
}

/// [`for_each_async_collect`] on an explicit runtime.
///
/// # Errors
///
/// Same as [`for_each_async_collect`].
pub fn for_each_async_collect_on<R, I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
    cancellation_token: Option<CancellationToken>,
) -> Result<Operation<()>>
where
    R: Runtime,
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    fan_out_collect::<R, _, _, _, _, _, _>(source, degree, body, cancellation_token)
}

/// Apply `body` to every element; a worker gives up at its first failure.
///
/// Other workers keep claiming items, so the elements a failed worker would
/// have taken are still processed by its siblings. Only when every worker has
/// failed are elements left unprocessed.
///
/// The returned operation succeeds if no item failed. Otherwise it fails with
/// the failure that stopped a worker, or with a `TaskError::Aggregate` of one
/// entry per stopped worker when several did. A panicking item stops its
/// worker with `TaskError::Cancelled`.
///
/// # Errors
///
/// Returns `TaskError::ContractViolation` if `degree` is zero.
#[cfg(feature = "runtime-tokio")]
pub fn for_each_async_all<I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Operation<()>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    for_each_async_all_on::<DefaultRuntime, _, _, _, _, _, _>(source, degree, body)
}

/// [`for_each_async_all`] on an explicit runtime.
///
/// # Errors
///
/// Same as [`for_each_async_all`].
pub fn for_each_async_all_on<R, I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
) -> Result<Operation<()>>
where
    R: Runtime,
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    fan_out_all::<R, _, _, _, _, _, _>(source, degree, body)
}

/// Extension trait providing the fan-out modes on any sequence.
#[cfg(feature = "runtime-tokio")]
pub trait ForEachAsyncExt<T>: IntoIterator<Item = T> + Sized {
    /// See [`for_each_async`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::ContractViolation` if `degree` is zero.
    fn for_each_async<U, E, F, Fut>(self, degree: usize, body: F) -> Result<Vec<Operation<U>>>
    where
        U: Clone + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static;

    /// See [`for_each_async_ordered`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::ContractViolation` if `degree` is zero.
    fn for_each_async_ordered<U, E, F, Fut>(
        self,
        degree: usize,
        body: F,
    ) -> Result<Vec<Operation<U>>>
    where
        U: Clone + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static;

    /// See [`for_each_async_collect`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::ContractViolation` if `degree` is zero.
    fn for_each_async_collect<U, E, F, Fut>(
        self,
        degree: usize,
        body: F,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<Operation<()>>
    where
        U: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static;

    /// See [`for_each_async_all`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::ContractViolation` if `degree` is zero.
    fn for_each_async_all<U, E, F, Fut>(self, degree: usize, body: F) -> Result<Operation<()>>
    where
        U: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static;
}

#[cfg(feature = "runtime-tokio")]
impl<I, T> ForEachAsyncExt<T> for I
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
{
    fn for_each_async<U, E, F, Fut>(self, degree: usize, body: F) -> Result<Vec<Operation<U>>>
    where
        U: Clone + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
    {
        for_each_async(self, degree, body)
    }

    fn for_each_async_ordered<U, E, F, Fut>(
        self,
        degree: usize,
        body: F,
    ) -> Result<Vec<Operation<U>>>
    where
        U: Clone + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
    {
        for_each_async_ordered(self, degree, body)
    }

    fn for_each_async_collect<U, E, F, Fut>(
        self,
        degree: usize,
        body: F,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<Operation<()>>
    where
        U: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
    {
        for_each_async_collect(self, degree, body, cancellation_token)
    }

    fn for_each_async_all<U, E, F, Fut>(self, degree: usize, body: F) -> Result<Operation<()>>
    where
        U: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
    {
        for_each_async_all(self, degree, body)
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::pin::pin;
use core::time::Duration;
use futures::future::{select, Either};
use std::sync::Arc;
use taskflux_core::{
    rebroadcast, CancellationToken, CompletionSource, Operation, Outcome, Runtime, Timer,
};

#[cfg(feature = "runtime-tokio")]
use taskflux_core::DefaultRuntime;

/// Race `operation` against a deadline.
///
/// The returned handle carries `operation`'s exact outcome if it terminates
/// within `duration`, and is cancelled otherwise. The underlying operation is
/// never interrupted.
///
/// A completion listener is attached to `operation` before the timer is
/// armed and stays attached after the deadline. A failure that arrives late
/// is therefore observed here and logged, and never reaches the unobserved
/// failure hook. Racing the two with a generic select and dropping the loser
/// gives no such guarantee.
///
/// The deadline timer is disarmed as soon as `operation` settles, so a long
/// `duration` does not keep a task alive after the race is decided.
///
/// # Example
///
/// ```
/// use std::io;
/// use std::time::Duration;
/// use taskflux_core::{Operation, Outcome};
/// use taskflux_exec::with_timeout;
///
/// # #[tokio::main]
/// # async fn main() {
/// let slow = Operation::spawn(async {
///     tokio::time::sleep(Duration::from_millis(200)).await;
///     Err::<(), _>(io::Error::other("too late to matter"))
/// });
///
/// let guarded = with_timeout(slow, Duration::from_millis(10));
/// assert!(guarded.await.is_cancelled());
/// # }
/// ```
#[cfg(feature = "runtime-tokio")]
pub fn with_timeout<T>(operation: Operation<T>, duration: Duration) -> Operation<T>
where
    T: Clone + Send + Sync + 'static,
{
    with_timeout_on::<DefaultRuntime, T>(operation, duration)
}

/// [`with_timeout`] with the deadline timer taken from `R`.
pub fn with_timeout_on<R, T>(operation: Operation<T>, duration: Duration) -> Operation<T>
where
    R: Runtime,
    T: Clone + Send + Sync + 'static,
{
    let source = Arc::new(CompletionSource::new());
    let guarded = source.handle();

    let settled = CancellationToken::new();

    let guard = Arc::clone(&source);
    let disarm = settled.clone();
    operation.on_complete(move |outcome| {
        disarm.cancel();
        if rebroadcast(&guard, outcome, T::clone) {
            return;
        }
        if let Outcome::Failed(error) = outcome {
            warn!("with_timeout: operation failed after its deadline: {}", error);
        }
    });

    // Already settled; no timer needed.
    if source.is_set() {
        return guarded;
    }

    let sleep = R::Timer::default().sleep_future(duration);
    R::spawn(async move {
        let sleep = pin!(sleep);
        let disarmed = pin!(settled.cancelled());
        match select(sleep, disarmed).await {
            Either::Left(_) => {
                if source.cancel() {
                    debug!("with_timeout: deadline of {:?} elapsed", duration);
                }
            }
            Either::Right(_) => debug!("with_timeout: timer disarmed"),
        }
    });

    guarded
}

/// Extension trait providing [`with_timeout`] on operations.
#[cfg(feature = "runtime-tokio")]
pub trait WithTimeoutExt<T> {
    /// See [`with_timeout`].
    fn with_timeout(self, duration: Duration) -> Operation<T>;
}

#[cfg(feature = "runtime-tokio")]
impl<T> WithTimeoutExt<T> for Operation<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn with_timeout(self, duration: Duration) -> Operation<T> {
        with_timeout(self, duration)
    }
}

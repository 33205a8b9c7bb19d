// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Copying the terminal outcome of one operation onto a [`CompletionSource`].
//!
//! This is the only place where an operation's terminal state is mapped to a
//! completion source; every executor in Taskflux goes through it.

use crate::completion_source::CompletionSource;
use crate::operation::Operation;
use crate::outcome::Outcome;

/// Apply `outcome` to `source`, transforming a success value with `mapper`.
///
/// A failure that aggregates exactly one cause is unwrapped to that cause;
/// any other failure is propagated unchanged. Returns `true` if `source`
/// was still unset.
///
/// # Example
///
/// ```
/// use taskflux_core::{rebroadcast, CompletionSource, Outcome};
///
/// let source = CompletionSource::new();
/// let handle = source.handle();
///
/// assert!(rebroadcast(&source, &Outcome::Succeeded(20), |value| value + 1));
/// assert!(matches!(handle.outcome(), Some(Outcome::Succeeded(21))));
/// ```
pub fn rebroadcast<T, U, F>(source: &CompletionSource<U>, outcome: &Outcome<T>, mapper: F) -> bool
where
    U: Send + Sync + 'static,
    F: FnOnce(&T) -> U,
{
    match outcome {
        Outcome::Succeeded(value) => source.resolve(mapper(value)),
        Outcome::Failed(error) => source.fail(error.clone().into_single_cause()),
        Outcome::Cancelled => source.cancel(),
    }
}

/// Rebroadcast `operation` onto `source` once it terminates.
///
/// Attaches a completion listener, so the operation counts as observed from
/// this point on.
pub fn adopt<T, U, F>(source: CompletionSource<U>, operation: &Operation<T>, mapper: F)
where
    T: Send + Sync + 'static,
    U: Send + Sync + 'static,
    F: FnOnce(&T) -> U + Send + 'static,
{
    operation.on_complete(move |outcome| {
        rebroadcast(&source, outcome, mapper);
    });
}

/// An operation carrying `element` together with `operation`'s value.
///
/// Failure and cancellation are propagated as they are.
///
/// # Example
///
/// ```
/// use taskflux_core::{tag, Operation, Outcome};
///
/// let temperature = Operation::succeeded(18);
/// let tagged = tag("Kyiv", &temperature);
///
/// assert!(matches!(tagged.outcome(), Some(Outcome::Succeeded(("Kyiv", 18)))));
/// ```
pub fn tag<E, T>(element: E, operation: &Operation<T>) -> Operation<(E, T)>
where
    E: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    let source = CompletionSource::new();
    let tagged = source.handle();
    adopt(source, operation, move |value: &T| (element, value.clone()));
    tagged
}

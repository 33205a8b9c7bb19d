// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A completion-ordered view over a fixed set of operations.

use core::fmt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use taskflux_core::{
    rebroadcast, tag, unobserved, CompletionSource, Operation, Outcome, TaskError,
};

/// Finished outcomes not yet handed out, and handles handed out but not yet
/// resolved. At most one of the two queues is non-empty at any time.
///
/// Pairs of handle and outcome wait in `ready` until the single active
/// deliverer resolves them, front to back.
struct ReorderState<T> {
    finished: VecDeque<Outcome<T>>,
    waiting: VecDeque<CompletionSource<T>>,
    ready: VecDeque<(CompletionSource<T>, Outcome<T>)>,
    delivering: bool,
    abandoned: bool,
}

impl<T: Clone> ReorderState<T> {
    /// Route a finished input to the oldest waiting handle, or park it.
    ///
    /// Returns the failure that nobody can receive any more.
    fn accept(&mut self, outcome: &Outcome<T>) -> Option<TaskError> {
        if let Some(source) = self.waiting.pop_front() {
            self.ready.push_back((source, outcome.clone()));
            return None;
        }

        if self.abandoned {
            return match outcome {
                Outcome::Failed(error) => Some(error.clone()),
                _ => None,
            };
        }

        self.finished.push_back(outcome.clone());
        None
    }

    /// Become the deliverer if there is work and nobody else is delivering.
    fn claim_delivery(&mut self) -> bool {
        if self.delivering || self.ready.is_empty() {
            return false;
        }
        self.delivering = true;
        true
    }
}

/// Resolve ready handles in the order they were paired.
///
/// Only the caller that won [`ReorderState::claim_delivery`] runs this, so
/// handle k is always resolved before handle k + 1.
fn deliver_ready<T>(state: &Mutex<ReorderState<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    loop {
        let (source, outcome) = {
            let mut state = state.lock();
            match state.ready.pop_front() {
                Some(pair) => pair,
                None => {
                    state.delivering = false;
                    return;
                }
            }
        };

        rebroadcast(&source, &outcome, T::clone);
    }
}

/// Lazily produces one pending handle per input operation.
///
/// The k-th handle yielded resolves with the outcome of the k-th input to
/// finish, and never before the handles yielded ahead of it. Producing a
/// handle never waits; inputs that finish before their handle is produced are
/// parked in completion order.
///
/// Dropping the iterator early gives up on the outcomes not yet handed out.
/// Failures among them, parked or still to come, go to the
/// [unobserved-failure hook](taskflux_core::unobserved).
pub struct CompletionOrder<T> {
    state: Arc<Mutex<ReorderState<T>>>,
    remaining: usize,
}

/// Turn `operations` into handles that resolve in completion order.
///
/// Every input gets exactly one completion listener here; nothing is polled.
///
/// # Example
///
/// ```
/// use std::io;
/// use std::time::Duration;
/// use taskflux_core::{Operation, Outcome};
/// use taskflux_exec::order_by_completion;
///
/// # #[tokio::main]
/// # async fn main() {
/// let make = |millis: u64| {
///     Operation::spawn(async move {
///         tokio::time::sleep(Duration::from_millis(millis)).await;
///         Ok::<_, io::Error>(millis)
///     })
/// };
///
/// let mut finished = Vec::new();
/// for handle in order_by_completion(vec![make(60), make(20), make(40)]) {
///     if let Outcome::Succeeded(millis) = handle.await {
///         finished.push(millis);
///     }
/// }
///
/// assert_eq!(finished, vec![20, 40, 60]);
/// # }
/// ```
pub fn order_by_completion<T, I>(operations: I) -> CompletionOrder<T>
where
    I: IntoIterator<Item = Operation<T>>,
    T: Clone + Send + Sync + 'static,
{
    let operations: Vec<Operation<T>> = operations.into_iter().collect();
    let state = Arc::new(Mutex::new(ReorderState {
        finished: VecDeque::with_capacity(operations.len()),
        waiting: VecDeque::new(),
        ready: VecDeque::new(),
        delivering: false,
        abandoned: false,
    }));

    for operation in &operations {
        let state = Arc::clone(&state);
        operation.on_complete(move |outcome| {
            let (deliver, lost) = {
                let mut state = state.lock();
                let lost = state.accept(outcome);
                (state.claim_delivery(), lost)
            };

            if let Some(error) = lost {
                unobserved::report(&error);
            }
            if deliver {
                deliver_ready(&state);
            }
        });
    }

    CompletionOrder {
        state,
        remaining: operations.len(),
    }
}

/// Pair each element with the operation `selector` yields for it, then order
/// the pairs by completion.
///
/// Handles carry the original element next to the resolved value, so results
/// can be attributed without relying on position.
pub fn order_by_completion_with<E, T, I, S>(elements: I, mut selector: S) -> CompletionOrder<(E, T)>
where
    I: IntoIterator<Item = E>,
    E: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    S: FnMut(&E) -> Operation<T>,
{
    order_by_completion(elements.into_iter().map(|element| {
        let operation = selector(&element);
        tag(element, &operation)
    }))
}

impl<T> Iterator for CompletionOrder<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = Operation<T>;

    fn next(&mut self) -> Option<Operation<T>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let source = CompletionSource::new();
        let handle = source.handle();

        let deliver = {
            let mut state = self.state.lock();
            match state.finished.pop_front() {
                Some(parked) => state.ready.push_back((source, parked)),
                None => state.waiting.push_back(source),
            }
            state.claim_delivery()
        };

        if deliver {
            deliver_ready(&self.state);
        }
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for CompletionOrder<T> where T: Clone + Send + Sync + 'static {}

impl<T> fmt::Debug for CompletionOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CompletionOrder")
            .field("remaining", &self.remaining)
            .field("parked", &state.finished.len())
            .field("waiting", &state.waiting.len())
            .finish()
    }
}

impl<T> Drop for CompletionOrder<T> {
    fn drop(&mut self) {
        let lost: Vec<TaskError> = {
            let mut state = self.state.lock();
            state.abandoned = true;
            state
                .finished
                .drain(..)
                .filter_map(|outcome| match outcome {
                    Outcome::Failed(error) => Some(error),
                    _ => None,
                })
                .collect()
        };

        for error in &lost {
            unobserved::report(error);
        }
    }
}

/// Extension trait providing [`order_by_completion`] on collections of operations.
pub trait OrderByCompletionExt<T>: IntoIterator<Item = Operation<T>> + Sized {
    /// See [`order_by_completion`].
    fn order_by_completion(self) -> CompletionOrder<T>;
}

impl<I, T> OrderByCompletionExt<T> for I
where
    I: IntoIterator<Item = Operation<T>>,
    T: Clone + Send + Sync + 'static,
{
    fn order_by_completion(self) -> CompletionOrder<T> {
        order_by_completion(self)
    }
}

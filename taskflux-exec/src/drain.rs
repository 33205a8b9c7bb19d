// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Processing a fixed set of operations one by one, in the order they finish.

use async_trait::async_trait;
use futures::future::select_all;
use taskflux_core::{tag, Operation, Outcome, Result, TaskError};

/// Invoke `on_each` once per operation, in completion order.
///
/// Each round waits until at least one remaining operation is terminal, takes
/// the first ready one in the remaining set, removes it and hands its value
/// to `on_each`. When several operations are ready in the same round, any of
/// them may come first.
///
/// # Errors
///
/// The first failed or cancelled operation taken ends the drain with its
/// error (`TaskError::Cancelled` for a cancellation). The operations still
/// remaining are abandoned; `drain` does not look at their outcomes.
///
/// # Example
///
/// ```
/// use std::io;
/// use std::time::Duration;
/// use taskflux_core::Operation;
/// use taskflux_exec::drain;
///
/// # #[tokio::main]
/// # async fn main() {
/// let slow = Operation::spawn(async {
///     tokio::time::sleep(Duration::from_millis(40)).await;
///     Ok::<_, io::Error>("slow")
/// });
/// let fast = Operation::spawn(async { Ok::<_, io::Error>("fast") });
///
/// let mut seen = Vec::new();
/// drain(vec![slow, fast], |_, value| seen.push(*value)).await.unwrap();
///
/// assert_eq!(seen, vec!["fast", "slow"]);
/// # }
/// ```
pub async fn drain<T, I, F>(operations: I, mut on_each: F) -> Result<()>
where
    I: IntoIterator<Item = Operation<T>>,
    T: Send + Sync + 'static,
    F: FnMut(&Operation<T>, &T),
{
    let mut live: Vec<Operation<T>> = operations.into_iter().collect();

    while !live.is_empty() {
        let (_, index, _) = select_all(live.iter().map(Operation::terminated)).await;
        let finished = live.remove(index);

        match finished.outcome() {
            Some(Outcome::Succeeded(value)) => on_each(&finished, value),
            Some(Outcome::Failed(error)) => return Err(error.clone()),
            Some(Outcome::Cancelled) => return Err(TaskError::Cancelled),
            None => unreachable!("select_all only yields terminated operations"),
        }
    }

    Ok(())
}

/// Pair every element with the operation `selector` produces for it and
/// process the pairs in completion order.
///
/// # Errors
///
/// Same as [`drain`].
pub async fn drain_with<E, T, I, S, P>(elements: I, mut selector: S, mut processor: P) -> Result<()>
where
    I: IntoIterator<Item = E>,
    E: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    S: FnMut(&E) -> Operation<T>,
    P: FnMut(&E, &T),
{
    let tagged: Vec<Operation<(E, T)>> = elements
        .into_iter()
        .map(|element| {
            let operation = selector(&element);
            tag(element, &operation)
        })
        .collect();

    drain(tagged, |_, (element, value)| processor(element, value)).await
}

/// Extension trait providing [`drain`] on collections of operations.
#[async_trait]
pub trait DrainExt<T>: IntoIterator<Item = Operation<T>> + Sized {
    /// See [`drain`].
    async fn drain_one_by_one<F>(self, on_each: F) -> Result<()>
    where
        F: FnMut(&Operation<T>, &T) + Send;
}

#[async_trait]
impl<I, T> DrainExt<T> for I
where
    I: IntoIterator<Item = Operation<T>> + Send,
    T: Send + Sync + 'static,
{
    async fn drain_one_by_one<F>(self, on_each: F) -> Result<()>
    where
        F: FnMut(&Operation<T>, &T) + Send,
    {
        drain(self, on_each).await
    }
}

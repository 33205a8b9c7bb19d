// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::partition::PartitionCursor;
use core::convert::Infallible;
use core::future::Future;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::StreamExt;
use std::error::Error;
use std::sync::Arc;
use taskflux_core::{
    rebroadcast, CancellationToken, CompletionSource, Operation, Outcome, Result, Runtime,
    TaskError,
};

/// Where a finished item's outcome is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotOrder {
    /// Slot j goes to the j-th item to finish, whichever worker ran it.
    Completion,
    /// Slot i belongs to source element i.
    Source,
}

pub(crate) fn check_degree(degree: usize) -> Result<()> {
    if degree == 0 {
        return Err(TaskError::contract_violation(
            "degree of parallelism must be positive",
        ));
    }
    Ok(())
}

pub(crate) fn fan_out<R, I, T, U, E, F, Fut>(
    source: I,
    degree: usize,
    body: F,
    order: SlotOrder,
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
    check_degree(degree)?;

    let items: Vec<T> = source.into_iter().collect();
    let slots: Arc<Vec<CompletionSource<U>>> =
        Arc::new((0..items.len()).map(|_| CompletionSource::new()).collect());
    let handles = slots.iter().map(CompletionSource::handle).collect();

    let workers = degree.min(items.len());
    let cursor = Arc::new(PartitionCursor::new(items));
    let body = Arc::new(body);

    for worker in 0..workers {
        let cursor = Arc::clone(&cursor);
        let slots = Arc::clone(&slots);
        let body = Arc::clone(&body);

        R::spawn(async move {
            debug!("for_each_async: worker {} started", worker);
            let mut processed = 0usize;

            while let Some((index, item)) = cursor.claim() {
                let operation = Operation::spawn_on::<R, _, E>(body(item));
                operation.terminated().await;

                let slot = match order {
                    SlotOrder::Completion => cursor.next_slot(),
                    SlotOrder::Source => index,
                };
                if let Some(outcome) = operation.outcome() {
                    let applied = rebroadcast(&slots[slot], outcome, U::clone);
                    debug_assert!(applied, "output slot {slot} assigned twice");
                }
                processed += 1;
            }

            debug!(
                "for_each_async: worker {} finished after {} items",
                worker, processed
            );
        });
    }

    Ok(handles)
}

pub(crate) fn fan_out_collect<R, I, T, U, E, F, Fut>(
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
    check_degree(degree)?;

    let items: Vec<T> = source.into_iter().collect();
    let workers = degree.min(items.len());
    let cursor = Arc::new(PartitionCursor::new(items));
    let body = Arc::new(body);
    let cancellation_token = cancellation_token.unwrap_or_default();
    let (errors_tx, errors_rx) = unbounded::<TaskError>();

    let workers: Vec<Operation<()>> = (0..workers)
        .map(|worker| {
            Operation::spawn_on::<R, _, Infallible>(collect_worker::<R, _, _, E, _, _>(
                worker,
                Arc::clone(&cursor),
                Arc::clone(&body),
                cancellation_token.clone(),
                errors_tx.clone(),
            ))
        })
        .collect();
    drop(errors_tx);

    Ok(Operation::spawn_on::<R, _, TaskError>(async move {
        let mut errors = Vec::new();
        for worker in &workers {
            worker.terminated().await;
            // A worker only ends up cancelled if its task was torn down.
            if let Some(Outcome::Cancelled) = worker.outcome() {
                errors.push(TaskError::Cancelled);
            }
        }

        errors.extend(errors_rx.collect::<Vec<_>>().await);

        // Workers only leave elements behind when the token stopped them.
        let skipped = cursor.remaining();
        if skipped > 0 {
            debug!("for_each_async: cancelled with {} items unclaimed", skipped);
            if errors.is_empty() {
                return Err(TaskError::Cancelled);
            }
            errors.push(TaskError::Cancelled);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!("for_each_async: {} items failed", errors.len());
            Err(TaskError::aggregate(errors))
        }
    }))
}

pub(crate) fn fan_out_all<R, I, T, U, E, F, Fut>(
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
    check_degree(degree)?;

    let items: Vec<T> = source.into_iter().collect();
    let workers = degree.min(items.len());
    let cursor = Arc::new(PartitionCursor::new(items));
    let body = Arc::new(body);

    let workers: Vec<Operation<()>> = (0..workers)
        .map(|worker| {
            Operation::spawn_on::<R, _, TaskError>(fail_fast_worker::<R, _, _, E, _, _>(
                worker,
                Arc::clone(&cursor),
                Arc::clone(&body),
            ))
        })
        .collect();

    Ok(Operation::spawn_on::<R, _, TaskError>(async move {
        let mut errors = Vec::new();
        for worker in &workers {
            worker.terminated().await;
            match worker.outcome() {
                Some(Outcome::Failed(error)) => errors.push(error.clone()),
                Some(Outcome::Cancelled) => errors.push(TaskError::Cancelled),
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!("for_each_async: {} workers stopped early", errors.len());
            Err(TaskError::aggregate(errors).into_single_cause())
        }
    }))
}

/// Runs claimed items one after another until the cursor is empty or an
/// item does not succeed. That first failure ends this worker only.
async fn fail_fast_worker<R, T, U, E, F, Fut>(
    worker: usize,
    cursor: Arc<PartitionCursor<T>>,
    body: Arc<F>,
) -> Result<()>
where
    R: Runtime,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    debug!("for_each_async: worker {} started", worker);

    while let Some((_, item)) = cursor.claim() {
        let operation = Operation::spawn_on::<R, _, E>(body(item));
        operation.terminated().await;

        match operation.outcome() {
            Some(Outcome::Failed(error)) => {
                debug!("for_each_async: worker {} stopped on {}", worker, error);
                return Err(error.clone());
            }
            Some(Outcome::Cancelled) => return Err(TaskError::Cancelled),
            _ => {}
        }
    }

    debug!("for_each_async: worker {} finished", worker);
    Ok(())
}

async fn collect_worker<R, T, U, E, F, Fut>(
    worker: usize,
    cursor: Arc<PartitionCursor<T>>,
    body: Arc<F>,
    cancellation_token: CancellationToken,
    errors: UnboundedSender<TaskError>,
) -> core::result::Result<(), Infallible>
where
    R: Runtime,
    T: Send + 'static,
    U: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = core::result::Result<U, E>> + Send + 'static,
{
    debug!("for_each_async: worker {} started", worker);

    while !cancellation_token.is_cancelled() {
        let Some((_, item)) = cursor.claim() else {
            break;
        };

        let operation = Operation::spawn_on::<R, _, E>(body(item));
        operation.terminated().await;

        let error = match operation.outcome() {
            Some(Outcome::Failed(error)) => error.clone(),
            Some(Outcome::Cancelled) => TaskError::Cancelled,
            _ => continue,
        };
        // The coordinator keeps the receiver until every worker is done.
        let _ = errors.unbounded_send(error);
    }

    debug!("for_each_async: worker {} finished", worker);
    Ok(())
}

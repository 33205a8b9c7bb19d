// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Handle to in-progress work with a single terminal outcome.

use crate::completion_source::CompletionSource;
use crate::outcome::Outcome;
use crate::unobserved;
use core::fmt;
use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{ready, Context, Poll};
use core::time::Duration;
use event_listener::{Event, EventListener};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::error::Error;
use std::sync::{Arc, OnceLock};
use taskflux_error::TaskError;
use taskflux_runtime::{Runtime, Timer};

#[cfg(feature = "runtime-tokio")]
use taskflux_runtime::DefaultRuntime;

pub(crate) type Listener<T> = Box<dyn FnOnce(&Outcome<T>) + Send>;

/// State shared by a [`CompletionSource`] and every handle derived from it.
pub(crate) struct Shared<T> {
    outcome: OnceLock<Outcome<T>>,
    listeners: Mutex<Vec<Listener<T>>>,
    event: Event,
    observed: AtomicBool,
}

impl<T> Shared<T> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            listeners: Mutex::new(Vec::new()),
            event: Event::new(),
            observed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// Apply `outcome` unless a terminal state is already set.
    ///
    /// Returns `true` when this call applied it. Listeners run on the calling
    /// context, after waiters have been woken.
    pub(crate) fn complete(&self, outcome: Outcome<T>) -> bool {
        if self.outcome.set(outcome).is_err() {
            return false;
        }

        // A listener registering concurrently either sees the outcome under
        // this lock or has already been pushed and is taken here.
        let listeners = mem::take(&mut *self.listeners.lock());
        self.event.notify(usize::MAX);

        if let Some(outcome) = self.outcome.get() {
            for listener in listeners {
                listener(outcome);
            }
        }
        true
    }

    fn mark_observed(&self) {
        self.observed.store(true, Ordering::Release);
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let observed = *self.observed.get_mut();
        if let Some(Outcome::Failed(error)) = self.outcome.get() {
            if !observed {
                unobserved::report(error);
            }
        }
    }
}

/// Read-only handle to an asynchronous operation.
///
/// An operation reaches exactly one terminal [`Outcome`]; before that it is
/// pending. Handles are cheap to clone and every clone sees the same outcome.
/// Completion can be consumed three ways, all event-driven:
///
/// - [`Operation::on_complete`] runs a listener exactly once,
/// - [`Operation::terminated`] waits without touching the value,
/// - awaiting the handle itself yields a clone of the outcome.
///
/// A failure has to be observed by one of these (or by [`Operation::outcome`]);
/// see [`crate::unobserved`] for what happens otherwise.
///
/// # Example
///
/// ```
/// use taskflux_core::{Operation, Outcome};
///
/// # #[tokio::main]
/// # async fn main() {
/// let operation = Operation::spawn(async { Ok::<_, std::io::Error>(21 * 2) });
///
/// match operation.await {
///     Outcome::Succeeded(value) => assert_eq!(value, 42),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// # }
/// ```
pub struct Operation<T> {
    shared: Arc<Shared<T>>,
    listener: Option<EventListener>,
}

impl<T> Operation<T> {
    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            listener: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.shared.is_terminal()
    }

    /// The terminal outcome, or `None` while pending.
    ///
    /// Reading a terminal outcome counts as observing it.
    pub fn outcome(&self) -> Option<&Outcome<T>> {
        let outcome = self.shared.outcome.get();
        if outcome.is_some() {
            self.shared.mark_observed();
        }
        outcome
    }

    /// Wait for the terminal state without reading it.
    pub fn terminated(&self) -> Terminated<'_, T> {
        Terminated {
            operation: self,
            listener: None,
        }
    }

    /// Whether both handles refer to the same operation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T: Send + Sync + 'static> Operation<T> {
    /// Attach a completion listener.
    ///
    /// The listener runs exactly once: immediately on the calling context if
    /// the operation is already terminal, otherwise on whichever context
    /// completes it. Attaching a listener counts as observing the outcome.
    pub fn on_complete<F>(&self, listener: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        self.shared.mark_observed();

        let mut listeners = self.shared.listeners.lock();
        match self.shared.outcome.get() {
            Some(outcome) => {
                drop(listeners);
                listener(outcome);
            }
            None => listeners.push(Box::new(listener)),
        }
    }

    /// An operation that is already terminal.
    pub fn from_outcome(outcome: Outcome<T>) -> Self {
        let source = CompletionSource::new();
        source.complete(outcome);
        source.handle()
    }

    pub fn succeeded(value: T) -> Self {
        Self::from_outcome(Outcome::Succeeded(value))
    }

    pub fn failed(error: TaskError) -> Self {
        Self::from_outcome(Outcome::from_result(Err(error)))
    }

    pub fn cancelled() -> Self {
        Self::from_outcome(Outcome::Cancelled)
    }

    /// Run `future` on the default worker pool and return its handle.
    ///
    /// An `Err` becomes [`Outcome::Failed`], except `TaskError::Cancelled`
    /// which becomes [`Outcome::Cancelled`]. If the future panics or is
    /// dropped before finishing, the handle is cancelled.
    #[cfg(feature = "runtime-tokio")]
    pub fn spawn<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        Self::spawn_on::<DefaultRuntime, F, E>(future)
    }

    /// [`Operation::spawn`] on an explicit runtime.
    pub fn spawn_on<R, F, E>(future: F) -> Self
    where
        R: Runtime,
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: Error + Send + Sync + 'static,
    {
        let source = CompletionSource::new();
        let operation = source.handle();

        R::spawn(async move {
            let result = future.await.map_err(TaskError::failure);
            source.complete(Outcome::from_result(result));
        });

        operation
    }
}

impl Operation<()> {
    /// An operation that succeeds once `duration` has elapsed.
    #[cfg(feature = "runtime-tokio")]
    pub fn delay(duration: Duration) -> Self {
        Self::delay_on::<DefaultRuntime>(duration)
    }

    pub fn delay_on<R: Runtime>(duration: Duration) -> Self {
        let sleep = R::Timer::default().sleep_future(duration);
        Self::spawn_on::<R, _, Infallible>(async move {
            sleep.await;
            Ok(())
        })
    }
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.shared))
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.outcome.get().map_or("pending", Outcome::label);
        f.debug_struct("Operation").field("state", &state).finish()
    }
}

impl<T: Clone> Future for Operation<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome<T>> {
        let this = self.get_mut();
        loop {
            if let Some(outcome) = this.shared.outcome.get() {
                this.shared.mark_observed();
                this.listener = None;
                return Poll::Ready(outcome.clone());
            }

            match this.listener.as_mut() {
                // Re-check after registering: completion may have raced us.
                None => this.listener = Some(this.shared.event.listen()),
                Some(listener) => {
                    ready!(Pin::new(listener).poll(cx));
                    this.listener = None;
                }
            }
        }
    }
}

/// Future returned by [`Operation::terminated`].
pub struct Terminated<'a, T> {
    operation: &'a Operation<T>,
    listener: Option<EventListener>,
}

impl<T> Future for Terminated<'_, T> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.operation.is_terminal() {
                return Poll::Ready(());
            }

            match self.listener.as_mut() {
                None => {
                    let listener = self.operation.shared.event.listen();
                    self.listener = Some(listener);
                }
                Some(listener) => {
                    ready!(Pin::new(listener).poll(cx));
                    self.listener = None;
                }
            }
        }
    }
}

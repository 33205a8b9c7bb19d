// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Single-assignment cell that manufactures an [`Operation`] and fulfils it.

use crate::operation::{Operation, Shared};
use crate::outcome::Outcome;
use core::fmt;
use std::sync::Arc;
use taskflux_error::TaskError;

/// Write side of an operation.
///
/// The first of [`resolve`](Self::resolve), [`fail`](Self::fail),
/// [`cancel`](Self::cancel) or [`complete`](Self::complete) wins; every later
/// call is a no-op and returns `false`. All of them may be called from any
/// thread. Handles obtained through [`handle`](Self::handle) can be shared
/// freely, while the source itself stays with whoever created it.
///
/// Dropping a source that was never set cancels its handle, so a producer
/// that panics or gives up cannot leave waiters hanging.
///
/// # Example
///
/// ```
/// use taskflux_core::{CompletionSource, Outcome};
///
/// let source = CompletionSource::new();
/// let handle = source.handle();
///
/// assert!(source.resolve(7));
/// assert!(!source.cancel());
/// assert!(matches!(handle.outcome(), Some(Outcome::Succeeded(7))));
/// ```
pub struct CompletionSource<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send + Sync + 'static> CompletionSource<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Read-only handle backed by this source's terminal state.
    pub fn handle(&self) -> Operation<T> {
        Operation::from_shared(Arc::clone(&self.shared))
    }

    pub fn resolve(&self, value: T) -> bool {
        self.shared.complete(Outcome::Succeeded(value))
    }

    /// Fail the operation. Failing with `TaskError::Cancelled` cancels it.
    pub fn fail(&self, error: TaskError) -> bool {
        self.shared.complete(Outcome::from_result(Err(error)))
    }

    pub fn cancel(&self) -> bool {
        self.shared.complete(Outcome::Cancelled)
    }

    pub fn complete(&self, outcome: Outcome<T>) -> bool {
        self.shared.complete(outcome)
    }

    pub fn is_set(&self) -> bool {
        self.shared.is_terminal()
    }
}

impl<T: Send + Sync + 'static> Default for CompletionSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for CompletionSource<T> {
    fn drop(&mut self) {
        if !self.shared.is_terminal() && self.shared.complete(Outcome::Cancelled) {
            debug!("Completion source dropped before being set; handle cancelled");
        }
    }
}

impl<T> fmt::Debug for CompletionSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSource")
            .field("is_set", &self.shared.is_terminal())
            .finish()
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide channel for failures nobody looked at.
//!
//! An operation that ends in failure must be observed: its outcome read,
//! awaited, or handed to a completion listener. When the last reference to a
//! failed operation goes away and none of that happened, the failure is logged
//! and passed to the hook installed here. Nothing is reported for operations
//! that succeeded or were cancelled.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use taskflux_core::{unobserved, Operation, TaskError};
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//! unobserved::set_unobserved_failure_hook(move |_error| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! drop(Operation::<u32>::failed(TaskError::contract_violation("nobody listens")));
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! unobserved::clear_unobserved_failure_hook();
//! ```

use parking_lot::RwLock;
use std::sync::Arc;
use taskflux_error::TaskError;

type Hook = Arc<dyn Fn(&TaskError) + Send + Sync>;

static HOOK: RwLock<Option<Hook>> = parking_lot::const_rwlock(None);

/// Install the hook receiving unobserved failures, replacing any previous one.
pub fn set_unobserved_failure_hook<F>(hook: F)
where
    F: Fn(&TaskError) + Send + Sync + 'static,
{
    *HOOK.write() = Some(Arc::new(hook));
}

pub fn clear_unobserved_failure_hook() {
    *HOOK.write() = None;
}

/// Log `error` as unobserved and pass it to the installed hook.
///
/// Operations call this themselves when dropped unobserved. Combinators that
/// absorb an outcome and then lose it call it directly.
pub fn report(error: &TaskError) {
    error!("Unobserved operation failure: {}", error);

    // Clone out so the hook runs without holding the lock.
    let hook = HOOK.read().clone();
    if let Some(hook) = hook {
        hook(error);
    }
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Capturing failures that reach the unobserved-failure hook.
//!
//! The hook is process-wide while tests in one binary run in parallel, so a
//! recorder also holds a global lock for its whole lifetime. Only one recorder
//! exists at a time; tests that create one are serialized against each other.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use taskflux_core::unobserved::{clear_unobserved_failure_hook, set_unobserved_failure_hook};
use tokio::sync::Notify;

static RECORDER_LOCK: Mutex<()> = parking_lot::const_mutex(());

#[derive(Debug, Default)]
struct Captured {
    messages: Mutex<Vec<String>>,
    reported: Notify,
}

/// Records every unobserved failure until dropped.
///
/// # Example
///
/// ```rust
/// use taskflux_core::{Operation, TaskError};
/// use taskflux_test_utils::UnobservedFailureRecorder;
///
/// let recorder = UnobservedFailureRecorder::install();
/// drop(Operation::<()>::failed(TaskError::contract_violation("ignored")));
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct UnobservedFailureRecorder {
    captured: Arc<Captured>,
    _serial: MutexGuard<'static, ()>,
}

impl UnobservedFailureRecorder {
    /// Wait for any other recorder to go away, then install a fresh hook.
    pub fn install() -> Self {
        let serial = RECORDER_LOCK.lock();
        let captured = Arc::new(Captured::default());

        let sink = Arc::clone(&captured);
        set_unobserved_failure_hook(move |error| {
            sink.messages.lock().push(error.to_string());
            sink.reported.notify_waiters();
        });

        Self {
            captured,
            _serial: serial,
        }
    }

    pub fn count(&self) -> usize {
        self.captured.messages.lock().len()
    }

    /// Display text of every failure seen so far, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.captured.messages.lock().clone()
    }

    /// Wait until at least `expected` failures were reported or `within`
    /// elapses. Returns whether the count was reached.
    pub async fn wait_for(&self, expected: usize, within: Duration) -> bool {
        let reached = async {
            loop {
                let reported = self.captured.reported.notified();
                if self.count() >= expected {
                    return;
                }
                reported.await;
            }
        };
        tokio::time::timeout(within, reached).await.is_ok()
    }
}

impl Drop for UnobservedFailureRecorder {
    fn drop(&mut self) {
        clear_unobserved_failure_hook();
    }
}

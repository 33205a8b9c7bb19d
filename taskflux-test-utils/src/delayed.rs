// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Operations that settle after a fixed delay.
//!
//! All of them run on the tokio runtime and must be created from within one.

use crate::test_error::TestError;
use std::time::Duration;
use taskflux_core::{Operation, Outcome, TaskError};
use tokio::time::sleep;

pub fn delayed_success<T>(value: T, delay: Duration) -> Operation<T>
where
    T: Send + Sync + 'static,
{
    Operation::spawn(async move {
        sleep(delay).await;
        Ok::<_, TestError>(value)
    })
}

/// Fails with [`TestError::Injected`] carrying `message`.
pub fn delayed_failure<T>(message: impl Into<String>, delay: Duration) -> Operation<T>
where
    T: Send + Sync + 'static,
{
    let error = TestError::injected(message);
    Operation::spawn(async move {
        sleep(delay).await;
        Err(error)
    })
}

pub fn delayed_cancellation<T>(delay: Duration) -> Operation<T>
where
    T: Send + Sync + 'static,
{
    Operation::spawn(async move {
        sleep(delay).await;
        Err(TaskError::Cancelled)
    })
}

/// Settles with `outcome` after `delay`.
pub fn delayed_outcome<T>(outcome: Outcome<T>, delay: Duration) -> Operation<T>
where
    T: Send + Sync + 'static,
{
    Operation::spawn(async move {
        sleep(delay).await;
        outcome.into_result()
    })
}

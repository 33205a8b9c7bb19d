// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use core::future::Future;

/// A shared worker pool plus the timer that belongs to it.
///
/// Callers never learn which thread runs a spawned unit of work.
pub trait Runtime: 'static {
    type Timer: Timer + Default;

    /// Run `future` to completion in the background, detached from the caller.
    fn spawn<F>(future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::iter::Enumerate;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::vec;

/// Work source shared by every fan-out worker.
///
/// Each element is handed to exactly one worker. Output slots are numbered
/// separately, in the order workers ask for them.
#[derive(Debug)]
pub(crate) struct PartitionCursor<T> {
    items: Mutex<Enumerate<vec::IntoIter<T>>>,
    next_slot: AtomicUsize,
}

impl<T> PartitionCursor<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items.into_iter().enumerate()),
            next_slot: AtomicUsize::new(0),
        }
    }

    /// Next unclaimed element together with its source position.
    pub(crate) fn claim(&self) -> Option<(usize, T)> {
        self.items.lock().next()
    }

    /// Number of elements no worker has claimed yet.
    pub(crate) fn remaining(&self) -> usize {
        self.items.lock().len()
    }

    /// Lock-free; every call returns a distinct slot.
    pub(crate) fn next_slot(&self) -> usize {
        self.next_slot.fetch_add(1, Ordering::AcqRel)
    }
}

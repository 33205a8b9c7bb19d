// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use taskflux_core::{adopt, rebroadcast, tag, CompletionSource, Operation, Outcome, TaskError};

fn failure(message: &str) -> TaskError {
    TaskError::failure(io::Error::other(message.to_string()))
}

#[test]
fn test_rebroadcast_maps_success_value() {
    let source = CompletionSource::new();
    let handle = source.handle();

    assert!(rebroadcast(&source, &Outcome::Succeeded(4), |v| v * 10));

    assert!(matches!(handle.outcome(), Some(Outcome::Succeeded(40))));
}

#[test]
fn test_rebroadcast_unwraps_single_cause_aggregate() {
    let source = CompletionSource::<u32>::new();
    let handle = source.handle();
    let outcome = Outcome::<u32>::Failed(TaskError::aggregate(vec![failure("only cause")]));

    rebroadcast(&source, &outcome, |v| *v);

    let error = handle.outcome().and_then(Outcome::error).unwrap();
    assert!(matches!(error, TaskError::Failure(_)));
    assert_eq!(error.to_string(), "Operation failed: only cause");
}

#[test]
fn test_rebroadcast_keeps_multi_cause_aggregate() {
    let source = CompletionSource::<u32>::new();
    let handle = source.handle();
    let outcome =
        Outcome::<u32>::Failed(TaskError::aggregate(vec![failure("first"), failure("second")]));

    rebroadcast(&source, &outcome, |v| *v);

    let error = handle.outcome().and_then(Outcome::error).unwrap();
    assert!(matches!(error, TaskError::Aggregate { count: 2, .. }));
}

#[test]
fn test_rebroadcast_propagates_cancellation() {
    let source = CompletionSource::<u32>::new();
    let handle = source.handle();

    rebroadcast(&source, &Outcome::<u32>::Cancelled, |v| *v);

    assert!(matches!(handle.outcome(), Some(Outcome::Cancelled)));
}

#[test]
fn test_rebroadcast_onto_set_source_is_noop() {
    let source = CompletionSource::new();
    let handle = source.handle();
    source.resolve(1);

    assert!(!rebroadcast(&source, &Outcome::Succeeded(2), |v| *v));

    assert!(matches!(handle.outcome(), Some(Outcome::Succeeded(1))));
}

#[test]
fn test_adopt_waits_for_completion() {
    let upstream = CompletionSource::new();
    let downstream = CompletionSource::new();
    let handle = downstream.handle();

    adopt(downstream, &upstream.handle(), |v: &u32| v.to_string());
    assert!(!handle.is_terminal());

    upstream.resolve(12);

    assert!(matches!(handle.outcome(), Some(Outcome::Succeeded(ref s)) if s == "12"));
}

#[test]
fn test_adopt_already_failed_operation() {
    let failed = Operation::<u32>::failed(failure("gone"));
    let downstream = CompletionSource::<u32>::new();
    let handle = downstream.handle();

    adopt(downstream, &failed, |v| *v);

    assert!(handle.outcome().unwrap().is_failed());
}

#[test]
fn test_tag_pairs_element_with_value() {
    let upstream = CompletionSource::new();
    let tagged = tag("Moscow", &upstream.handle());

    upstream.resolve(-3);

    assert!(matches!(tagged.outcome(), Some(Outcome::Succeeded(("Moscow", -3)))));
}

#[test]
fn test_tag_propagates_failure_and_cancellation() {
    let failing = CompletionSource::<u32>::new();
    let cancelled = CompletionSource::<u32>::new();
    let tagged_failure = tag(1, &failing.handle());
    let tagged_cancel = tag(2, &cancelled.handle());

    failing.fail(failure("no data"));
    cancelled.cancel();

    assert!(tagged_failure.outcome().unwrap().is_failed());
    assert!(tagged_cancel.outcome().unwrap().is_cancelled());
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use parking_lot::Mutex;
use std::io;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use taskflux_core::{CompletionSource, IntoTaskError, Operation, Outcome, TaskError};
use taskflux_exec::{order_by_completion, order_by_completion_with, OrderByCompletionExt};
use taskflux_test_utils::weather::{by_latency, cities, fetch_forecast};
use taskflux_test_utils::{delayed_cancellation, delayed_failure, delayed_success};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn label<T>(outcome: &Outcome<T>) -> String
where
    T: std::fmt::Debug,
{
    match outcome {
        Outcome::Succeeded(value) => format!("ok:{value:?}"),
        Outcome::Failed(error) => format!("err:{error}"),
        Outcome::Cancelled => "cancelled".to_string(),
    }
}

#[tokio::test]
async fn test_three_two_one_scenario() -> anyhow::Result<()> {
    // Durations 3s, 1s, 2s scaled down to milliseconds.
    let operations = vec![
        delayed_success("3s", ms(150)),
        delayed_success("1s", ms(50)),
        delayed_success("2s", ms(100)),
    ];

    let mut resolved = Vec::new();
    for handle in order_by_completion(operations) {
        match handle.await {
            Outcome::Succeeded(name) => resolved.push(name),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(resolved, vec!["1s", "2s", "3s"]);
    Ok(())
}

#[tokio::test]
async fn test_construction_does_not_wait() -> anyhow::Result<()> {
    let operations = vec![
        delayed_success(1, ms(200)),
        delayed_success(2, ms(200)),
    ];

    let order = order_by_completion(operations);
    assert_eq!(order.len(), 2);

    let handles: Vec<_> = order.collect();
    assert_eq!(handles.len(), 2);
    assert!(handles.iter().all(|handle| !handle.is_terminal()));
    Ok(())
}

#[tokio::test]
async fn test_handles_resolve_in_rank_order() -> anyhow::Result<()> {
    let delays = [70, 10, 130, 40, 100, 20];
    let operations = delays
        .iter()
        .map(|&delay| delayed_success(delay, ms(delay)))
        .collect::<Vec<_>>();

    let resolved = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = order_by_completion(operations).collect();
    for (rank, handle) in handles.iter().enumerate() {
        let resolved = resolved.clone();
        handle.on_complete(move |_| resolved.lock().push(rank));
    }

    for handle in &handles {
        handle.terminated().await;
    }
    tokio::time::sleep(ms(20)).await;

    assert_eq!(*resolved.lock(), (0..delays.len()).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_rank_order_holds_when_inputs_finish_on_many_threads() {
    const INPUTS: usize = 64;
    const THREADS: usize = 8;

    for _ in 0..200 {
        let sources: Vec<CompletionSource<usize>> =
            (0..INPUTS).map(|_| CompletionSource::new()).collect();
        let handles: Vec<_> =
            order_by_completion(sources.iter().map(CompletionSource::handle).collect::<Vec<_>>())
                .collect();

        let resolved = Arc::new(Mutex::new(Vec::with_capacity(INPUTS)));
        for (rank, handle) in handles.iter().enumerate() {
            let resolved = resolved.clone();
            handle.on_complete(move |_| resolved.lock().push(rank));
        }

        let mut shares: Vec<Vec<CompletionSource<usize>>> = (0..THREADS).map(|_| Vec::new()).collect();
        for (index, source) in sources.into_iter().enumerate() {
            shares[index % THREADS].push(source);
        }

        let barrier = Arc::new(Barrier::new(THREADS));
        let resolvers: Vec<_> = shares
            .into_iter()
            .map(|share| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for (value, source) in share.into_iter().enumerate() {
                        source.resolve(value);
                    }
                })
            })
            .collect();
        for resolver in resolvers {
            resolver.join().expect("resolver thread panicked");
        }

        assert_eq!(*resolved.lock(), (0..INPUTS).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_outcomes_are_a_permutation_of_inputs() -> anyhow::Result<()> {
    let operations = vec![
        delayed_success(1u8, ms(60)),
        delayed_failure("flaky", ms(20)),
        delayed_cancellation(ms(40)),
        delayed_success(4u8, ms(5)),
        Operation::succeeded(5u8),
    ];

    let mut expected = Vec::new();
    for operation in &operations {
        expected.push(label(&operation.clone().await));
    }

    let mut actual = Vec::new();
    for handle in operations.order_by_completion() {
        actual.push(label(&handle.await));
    }

    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
    Ok(())
}

#[tokio::test]
async fn test_late_iteration_keeps_completion_order() -> anyhow::Result<()> {
    let operations = vec![
        delayed_success('c', ms(60)),
        delayed_success('a', ms(10)),
        delayed_success('b', ms(35)),
    ];

    let order = order_by_completion(operations.clone());
    for operation in &operations {
        operation.terminated().await;
    }
    // Listeners run on the completing context right after the outcome is set.
    tokio::time::sleep(ms(20)).await;

    let mut resolved = String::new();
    for handle in order {
        assert!(handle.is_terminal(), "parked outcome should be handed out at once");
        if let Some(Outcome::Succeeded(value)) = handle.outcome() {
            resolved.push(*value);
        }
    }

    assert_eq!(resolved, "abc");
    Ok(())
}

#[tokio::test]
async fn test_failure_is_carried_to_its_rank() -> anyhow::Result<()> {
    let operations = vec![
        delayed_success(1, ms(80)),
        delayed_failure("first to finish", ms(10)),
    ];

    let handles: Vec<_> = order_by_completion(operations).collect();

    let first = handles[0].clone().await;
    assert_eq!(
        first.error().map(ToString::to_string),
        Some("Operation failed: Injected failure: first to finish".to_string())
    );
    assert!(matches!(handles[1].clone().await, Outcome::Succeeded(1)));
    Ok(())
}

#[tokio::test]
async fn test_single_cause_aggregate_is_unwrapped() -> anyhow::Result<()> {
    let inner = io::Error::other("only cause").into_task_error();
    let operation = Operation::<u8>::failed(TaskError::aggregate(vec![inner]));

    let mut order = order_by_completion(vec![operation]);
    let handle = order.next().expect("one handle per input");

    assert!(order.next().is_none());
    assert!(matches!(
        handle.await,
        Outcome::Failed(TaskError::Failure(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_ties_resolve_in_any_order() -> anyhow::Result<()> {
    // If ties occur, any resolution order among ties is acceptable.
    let operations = (0..5).map(Operation::succeeded).collect::<Vec<_>>();

    let mut values = Vec::new();
    for handle in order_by_completion(operations) {
        if let Outcome::Succeeded(value) = handle.await {
            values.push(value);
        }
    }

    values.sort_unstable();
    assert_eq!(values, (0..5).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn test_with_selector_tags_each_city() -> anyhow::Result<()> {
    let cities = cities();

    let mut finished = Vec::new();
    for handle in order_by_completion_with(cities.clone(), fetch_forecast) {
        match handle.await {
            Outcome::Succeeded((city, forecast)) => {
                assert_eq!(city.name, forecast.city);
                assert_eq!(city.temperature, forecast.temperature);
                finished.push(city.name);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(finished, by_latency(&cities));
    Ok(())
}

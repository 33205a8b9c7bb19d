// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::collections::HashSet;
use taskflux::prelude::*;
use taskflux::{for_each_async, for_each_async_collect};
use taskflux_test_utils::weather::{cities, fetch_forecast, City};

async fn lookup(city: City) -> Result<(&'static str, i32), TaskError> {
    match fetch_forecast(&city).await {
        Outcome::Succeeded(forecast) => Ok((city.name, forecast.temperature)),
        Outcome::Failed(error) => Err(error),
        Outcome::Cancelled => Err(TaskError::Cancelled),
    }
}

/// Results come back in completion order, so each carries its city name.
#[tokio::test]
async fn test_fan_out_results_are_self_describing() -> anyhow::Result<()> {
    let cities = cities();
    let expected: HashSet<_> = cities
        .iter()
        .map(|city| (city.name, city.temperature))
        .collect();

    let handles = for_each_async(cities, 2, lookup)?;

    let mut seen = HashSet::new();
    for handle in handles {
        seen.insert(handle.await.into_result()?);
    }

    assert_eq!(seen, expected);
    Ok(())
}

/// Source-order mode lines results up with the input.
#[tokio::test]
async fn test_fan_out_in_source_order() -> anyhow::Result<()> {
    let cities = cities();
    let names: Vec<_> = cities.iter().map(|city| city.name).collect();

    let handles = cities.for_each_async_ordered(3, lookup)?;

    let mut ordered = Vec::new();
    for handle in handles {
        ordered.push(handle.await.into_result()?.0);
    }

    assert_eq!(ordered, names);
    Ok(())
}

/// A batch job keeps going past outages and reports all of them at the end.
#[tokio::test]
async fn test_batch_collects_every_outage() -> anyhow::Result<()> {
    let cities: Vec<_> = cities()
        .into_iter()
        .map(|city| match city.name {
            "Oslo" | "Lima" => city.unavailable(),
            _ => city,
        })
        .collect();

    let batch = for_each_async_collect(cities, 2, lookup, None)?;

    let error = batch.await.into_result().expect_err("two cities are down");
    let mut outages: Vec<_> = error.errors().iter().map(ToString::to_string).collect();
    outages.sort();
    assert_eq!(
        outages,
        vec![
            "Operation failed: Service unavailable: Lima",
            "Operation failed: Service unavailable: Oslo",
        ]
    );
    Ok(())
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A small weather service stand-in for scenario tests.

use crate::test_error::TestError;
use std::time::Duration;
use taskflux_core::Operation;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct City {
    pub name: &'static str,
    pub latency: Duration,
    pub temperature: i32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    pub city: &'static str,
    pub temperature: i32,
}

impl City {
    pub const fn new(name: &'static str, latency_ms: u64, temperature: i32) -> Self {
        Self {
            name,
            latency: Duration::from_millis(latency_ms),
            temperature,
            available: true,
        }
    }

    /// Same city, but every lookup fails.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// Five cities with distinct latencies, slowest first.
pub fn cities() -> Vec<City> {
    vec![
        City::new("Oslo", 120, -3),
        City::new("Lisbon", 30, 21),
        City::new("Kyiv", 90, 8),
        City::new("Cairo", 10, 33),
        City::new("Lima", 60, 17),
    ]
}

/// Look up the forecast for `city`, taking `city.latency`.
pub fn fetch_forecast(city: &City) -> Operation<Forecast> {
    let city = city.clone();
    Operation::spawn(async move {
        sleep(city.latency).await;
        if !city.available {
            return Err(TestError::unavailable(city.name));
        }
        Ok(Forecast {
            city: city.name,
            temperature: city.temperature,
        })
    })
}

/// City names sorted by latency, i.e. the order lookups finish in.
pub fn by_latency(cities: &[City]) -> Vec<&'static str> {
    let mut sorted = cities.to_vec();
    sorted.sort_by_key(|city| city.latency);
    sorted.into_iter().map(|city| city.name).collect()
}

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Error type produced by the test fixtures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("Injected failure: {0}")]
    Injected(String),

    #[error("Service unavailable: {service}")]
    Unavailable { service: String },
}

impl TestError {
    pub fn injected(message: impl Into<String>) -> Self {
        Self::Injected(message.into())
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
        }
    }
}

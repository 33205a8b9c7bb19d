// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Execution collaborators used by Taskflux: a worker pool that runs units of
//! work on some execution context, and a timer that produces sleep futures.

pub mod impls;
pub mod runtime;
pub mod timer;

pub use runtime::Runtime;
pub use timer::Timer;

#[cfg(feature = "runtime-tokio")]
pub use impls::tokio::{TokioRuntime, TokioTimer};

/// Runtime selected by the enabled `runtime-*` feature.
#[cfg(feature = "runtime-tokio")]
pub type DefaultRuntime = TokioRuntime;

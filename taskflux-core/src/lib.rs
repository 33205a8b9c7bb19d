// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core types of Taskflux: operation handles, completion sources and the
//! helper that carries one operation's outcome over to another.

#[macro_use]
mod logging;

pub mod cancellation_token;
pub mod completion_source;
pub mod operation;
pub mod outcome;
pub mod rebroadcast;
pub mod unobserved;

pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::completion_source::CompletionSource;
pub use self::operation::{Operation, Terminated};
pub use self::outcome::Outcome;
pub use self::rebroadcast::{adopt, rebroadcast, tag};
pub use taskflux_error::{IntoTaskError, Result, TaskError};
pub use taskflux_runtime::{Runtime, Timer};

#[cfg(feature = "runtime-tokio")]
pub use taskflux_runtime::DefaultRuntime;

// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the Taskflux operation toolkit
//!
//! This crate defines the root [`TaskError`] type shared by every Taskflux crate.
//! An operation ends in exactly one terminal state; the failure and cancellation
//! states are both carried by [`TaskError`] so they can flow through `?`.
//!
//! # Examples
//!
//! ```
//! use taskflux_error::{Result, TaskError};
//!
//! fn configure(degree_of_parallelism: usize) -> Result<usize> {
//!     if degree_of_parallelism == 0 {
//!         return Err(TaskError::contract_violation(
//!             "degree of parallelism must be positive",
//!         ));
//!     }
//!     Ok(degree_of_parallelism)
//! }
//!
//! assert!(configure(0).is_err());
//! ```

use std::error::Error;
use std::sync::Arc;

/// Root error type for all Taskflux operations
///
/// Outcomes are shared by every handle of an operation, so the error is
/// cheaply cloneable: user errors are kept behind an [`Arc`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    /// A caller-level error raised while producing a value
    #[error("Operation failed: {0}")]
    Failure(#[source] Arc<dyn Error + Send + Sync>),

    /// The operation reached its terminal state without a value or an error
    #[error("Operation was cancelled")]
    Cancelled,

    /// Independently caught per-item failures
    ///
    /// Produced by fan-out runs that keep going when single items fail.
    #[error("Multiple errors occurred: {count} errors")]
    Aggregate {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors, in the order they were collected
        errors: Vec<TaskError>,
    },

    /// Invalid configuration passed by the caller
    ///
    /// Fatal: the call is rejected before any work starts.
    #[error("Contract violation: {context}")]
    ContractViolation {
        /// Which argument was rejected and why
        context: String,
    },
}

impl TaskError {
    /// Wrap a user error
    ///
    /// A `TaskError` passed in is returned unchanged instead of being nested.
    pub fn failure(error: impl Error + Send + Sync + 'static) -> Self {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(error);
        match boxed.downcast::<TaskError>() {
            Ok(task_error) => *task_error,
            Err(other) => Self::Failure(Arc::from(other)),
        }
    }

    /// Create a contract violation with the given context
    pub fn contract_violation(context: impl Into<String>) -> Self {
        Self::ContractViolation {
            context: context.into(),
        }
    }

    /// Aggregate collected errors into an `Aggregate` variant
    ///
    /// # Examples
    ///
    /// ```
    /// use taskflux_error::TaskError;
    ///
    /// let error = TaskError::aggregate(vec![TaskError::Cancelled, TaskError::Cancelled]);
    /// assert!(matches!(error, TaskError::Aggregate { count: 2, .. }));
    /// ```
    #[must_use]
    pub fn aggregate(errors: Vec<TaskError>) -> Self {
        Self::Aggregate {
            count: errors.len(),
            errors,
        }
    }

    /// Unwrap an aggregate holding exactly one cause to that cause
    ///
    /// Every other error, including aggregates of zero or several causes,
    /// is returned unchanged.
    #[must_use]
    pub fn into_single_cause(self) -> Self {
        match self {
            Self::Aggregate { mut errors, .. } if errors.len() == 1 => errors.remove(0),
            other => other,
        }
    }

    /// The individual errors of an aggregate, or this error alone
    #[must_use]
    pub fn errors(&self) -> &[TaskError] {
        match self {
            Self::Aggregate { errors, .. } => errors,
            other => core::slice::from_ref(other),
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error indicates a permanent failure
    ///
    /// Contract violations never succeed when repeated with the same arguments.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

/// Specialized Result type for Taskflux operations
///
/// # Examples
///
/// ```
/// use taskflux_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TaskError>;

/// Extension trait for converting errors into `TaskError`
///
/// Implemented for all types that implement `std::error::Error + Send + Sync + 'static`.
pub trait IntoTaskError {
    fn into_task_error(self) -> TaskError;
}

impl<E: Error + Send + Sync + 'static> IntoTaskError for E {
    fn into_task_error(self) -> TaskError {
        TaskError::failure(self)
    }
}

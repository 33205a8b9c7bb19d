// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use taskflux_error::{Result, TaskError};

/// Terminal state of an operation.
///
/// Cancellation is a state of its own, distinct from failure: it carries
/// neither a value nor an error.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Succeeded(T),
    Failed(TaskError),
    Cancelled,
}

impl<T> Outcome<T> {
    /// Convert a result, mapping `Err(TaskError::Cancelled)` to [`Outcome::Cancelled`].
    ///
    /// # Example
    ///
    /// ```
    /// use taskflux_core::{Outcome, TaskError};
    ///
    /// let outcome = Outcome::<u32>::from_result(Err(TaskError::Cancelled));
    /// assert!(outcome.is_cancelled());
    /// ```
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            Err(TaskError::Cancelled) => Self::Cancelled,
            Err(error) => Self::Failed(error),
        }
    }

    /// Convert back into a result; cancellation becomes `Err(TaskError::Cancelled)`.
    ///
    /// # Errors
    /// Returns the failure, or `TaskError::Cancelled` for a cancelled outcome.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(error) => Err(error),
            Self::Cancelled => Err(TaskError::Cancelled),
        }
    }

    /// Borrowing version of [`Outcome::into_result`].
    ///
    /// # Errors
    /// Returns a clone of the failure, or `TaskError::Cancelled`.
    pub fn as_result(&self) -> Result<&T> {
        match self {
            Self::Succeeded(value) => Ok(value),
            Self::Failed(error) => Err(error.clone()),
            Self::Cancelled => Err(TaskError::Cancelled),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Succeeded(value) => Outcome::Succeeded(f(value)),
            Self::Failed(error) => Outcome::Failed(error),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        Self::from_result(result)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-assignment deferred value.
//!
//! The schema compiler publishes a `Future` for a record before it
//! recurses into the record's fields, so a field that cycles back to the
//! same record picks up the placeholder instead of recursing. The TypeVar
//! resolver uses the same container for bindings that are only known once
//! the whole inheritance chain has been walked.

use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Raised when a [`Future`] is read before being set, or set twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidStateError(&'static str);

impl InvalidStateError {
    pub(crate) const NOT_SET: Self = Self("result has not been set");
    pub(crate) const ALREADY_SET: Self = Self("result has already been set");
}

/// A value that becomes available exactly once.
pub struct Future<T> {
    slot: OnceLock<T>,
}

impl<T> Future<T> {
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Return `true` if the value is available.
    pub fn done(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Return the deferred value.
    pub fn result(&self) -> Result<&T, InvalidStateError> {
        self.slot.get().ok_or(InvalidStateError::NOT_SET)
    }

    /// Store the value. A second call fails and leaves the first value in place.
    pub fn set_result(&self, value: T) -> Result<(), InvalidStateError> {
        self.slot
            .set(value)
            .map_err(|_| InvalidStateError::ALREADY_SET)
    }
}

impl<T> Default for Future<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.get() {
            Some(value) => f.debug_tuple("Future").field(value).finish(),
            None => f.write_str("Future(<pending>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_before_set() {
        let future: Future<i32> = Future::new();
        assert!(!future.done());
        let err = future.result().unwrap_err();
        assert_eq!(err.to_string(), "result has not been set");
    }

    #[test]
    fn test_set_once() {
        let future = Future::new();
        future.set_result(42).unwrap();
        assert!(future.done());
        assert_eq!(*future.result().unwrap(), 42);
    }

    #[test]
    fn test_set_twice_keeps_first_value() {
        let future = Future::new();
        future.set_result("first").unwrap();
        let err = future.set_result("second").unwrap_err();
        assert_eq!(err.to_string(), "result has already been set");
        assert_eq!(*future.result().unwrap(), "first");
    }
}

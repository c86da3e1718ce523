// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compute-once class attribute with recursion detection.
//!
//! The first access computes the value under a re-entrant lock and stores
//! it; later accesses read it without locking. A second thread arriving
//! while the value is being computed blocks, then reuses the stored value.
//! The computing thread re-entering the same attribute (the computation
//! needs its own result) gets an [`AttributeError`] instead of a deadlock.

use parking_lot::ReentrantMutex;
use std::cell::Cell;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Raised when an attribute's computation reads the attribute itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recursive evaluation of {owner}.{attribute}")]
pub struct AttributeError {
    pub owner: String,
    pub attribute: String,
}

pub struct LazyAttribute<T> {
    owner: String,
    name: String,
    value: OnceLock<T>,
    /// Set while the owning thread is computing.
    in_progress: ReentrantMutex<Cell<bool>>,
}

impl<T> LazyAttribute<T> {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            value: OnceLock::new(),
            in_progress: ReentrantMutex::new(Cell::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value, if already computed.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// The value, computing it with `init` on first access. A failed
    /// computation stores nothing; the next access retries.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E>
    where
        E: From<AttributeError>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let flag = self.in_progress.lock();
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if flag.get() {
            return Err(AttributeError {
                owner: self.owner.clone(),
                attribute: self.name.clone(),
            }
            .into());
        }

        flag.set(true);
        let computed = {
            let _reset = ResetOnDrop(&*flag);
            init()
        };
        let value = computed?;
        log::debug!("[lazy] computed {}.{}", self.owner, self.name);
        Ok(self.value.get_or_init(|| value))
    }
}

/// Clears the in-progress flag, also when `init` panics.
struct ResetOnDrop<'a>(&'a Cell<bool>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T> fmt::Debug for LazyAttribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<lazy {}.{} ({})>",
            self.owner,
            self.name,
            if self.value.get().is_some() { "set" } else { "unset" }
        )
    }
}
